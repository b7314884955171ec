// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::transport::session::SessionStream;
use crate::raise_error;
use rustls::RootCertStore;
use std::net::{SocketAddr, ToSocketAddrs};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_io_timeout::TimeoutStream;

pub(crate) const TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn resolve_to_socket_addr(domain: &str, port: u16) -> LeadGateResult<SocketAddr> {
    (domain, port)
        .to_socket_addrs()
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?
        .next()
        .ok_or_else(|| {
            raise_error!(
                format!("Could not resolve address for {domain}:{port}"),
                ErrorCode::NetworkError
            )
        })
}

pub(crate) async fn establish_tcp_connection_with_timeout(
    address: SocketAddr,
) -> LeadGateResult<Pin<Box<TimeoutStream<TcpStream>>>> {
    let tcp_stream = timeout(TIMEOUT, TcpStream::connect(address))
        .await
        .map_err(|_| {
            raise_error!(
                format!("Connection to {address} timed out"),
                ErrorCode::ConnectionTimeout
            )
        })?
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;

    // Disable Nagle's algorithm for more efficient network communication
    tcp_stream
        .set_nodelay(true)
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;

    let mut timeout_stream = TimeoutStream::new(tcp_stream);
    timeout_stream.set_write_timeout(Some(TIMEOUT));
    timeout_stream.set_read_timeout(Some(TIMEOUT));
    Ok(Box::pin(timeout_stream))
}

pub(crate) async fn establish_tls_connection(
    address: SocketAddr,
    server_hostname: &str,
) -> LeadGateResult<Box<dyn SessionStream>> {
    let tcp_stream = establish_tcp_connection_with_timeout(address).await?;

    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.into(),
    };
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls_connector = tokio_rustls::TlsConnector::from(Arc::new(config));

    let server_name = rustls_pki_types::ServerName::try_from(server_hostname)
        .map_err(|_| raise_error!("Invalid DNS name".into(), ErrorCode::NetworkError))?
        .to_owned();

    let tls_stream = tls_connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;

    let boxed_stream: Box<dyn SessionStream> = Box::new(tls_stream);
    Ok(boxed_stream)
}
