// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use crate::utc_now;
use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl,
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub type GoogleOAuth2Client = oauth2::Client<
    oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
    oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>,
    oauth2::StandardTokenIntrospectionResponse<
        oauth2::EmptyExtraTokenFields,
        oauth2::basic::BasicTokenType,
    >,
    oauth2::StandardRevocableToken,
    oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// A freshly minted Google access token. Google only rotates the refresh
/// token occasionally, so it is optional here.
pub struct RefreshedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry (epoch milliseconds)
    pub expires_at: Option<i64>,
}

fn build_google_client() -> LeadGateResult<GoogleOAuth2Client> {
    let client_id = SETTINGS.leadgate_google_client_id.clone().ok_or_else(|| {
        raise_error!(
            "'leadgate_google_client_id' is not configured".into(),
            ErrorCode::MissingConfiguration
        )
    })?;
    let client_secret = SETTINGS
        .leadgate_google_client_secret
        .clone()
        .ok_or_else(|| {
            raise_error!(
                "'leadgate_google_client_secret' is not configured".into(),
                ErrorCode::MissingConfiguration
            )
        })?;

    let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.into())
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InvalidParameter))?;
    let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.into())
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InvalidParameter))?;

    Ok(BasicClient::new(ClientId::new(client_id))
        .set_client_secret(ClientSecret::new(client_secret))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url))
}

/// Exchanges a stored refresh token for a fresh access token at Google's
/// token endpoint.
pub async fn refresh_google_token(refresh_token: &str) -> LeadGateResult<RefreshedToken> {
    let client = build_google_client()?;
    let http_client = oauth2::reqwest::ClientBuilder::new()
        .redirect(oauth2::reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

    let response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(&http_client)
        .await
        .map_err(|e| {
            raise_error!(
                format!("Failed to refresh Google access token: {}", e),
                ErrorCode::OAuth2RefreshFailed
            )
        })?;

    let expires_at = response
        .expires_in()
        .map(|duration| utc_now!() + duration.as_millis() as i64);

    Ok(RefreshedToken {
        access_token: response.access_token().secret().to_owned(),
        refresh_token: response.refresh_token().map(|r| r.secret().to_owned()),
        expires_at,
    })
}
