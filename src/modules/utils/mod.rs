// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;

pub mod encrypt;
pub mod net;
pub mod shutdown;

#[macro_export]
macro_rules! leadgate_version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}

#[macro_export]
macro_rules! utc_now {
    () => {{
        use chrono::Utc;
        Utc::now().timestamp_millis()
    }};
}

#[macro_export]
macro_rules! raise_error {
    ($msg:expr, $code:expr) => {
        $crate::modules::error::LeadGateError::Generic {
            message: $msg,
            location: snafu::Location::default(),
            code: $code,
        }
    };
}

#[macro_export]
macro_rules! encrypt {
    ($plaintext:expr) => {{
        $crate::modules::utils::encrypt::encrypt_string($plaintext)
    }};
}

#[macro_export]
macro_rules! decrypt {
    ($plaintext:expr) => {{
        $crate::modules::utils::encrypt::decrypt_string($plaintext)
    }};
}

/// Random 53-bit entity id. Masked so the value survives a round trip
/// through JSON consumers that store numbers as f64.
#[macro_export]
macro_rules! id {
    () => {{
        $crate::modules::utils::generate_id()
    }};
}

pub fn generate_id() -> u64 {
    (rand::random::<u64>()) & 0x1F_FFFF_FFFF_FFFF
}

pub fn validate_email(email: &str) -> crate::modules::error::LeadGateResult<()> {
    use std::str::FromStr;
    let email_address = email_address::EmailAddress::from_str(email).map_err(|_| {
        raise_error!(
            format!("invalid email address: '{}'", email),
            ErrorCode::InvalidParameter
        )
    })?;
    if email_address.as_str() != email {
        return Err(raise_error!(
            format!("invalid email address: '{}'", email),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}
