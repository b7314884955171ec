// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10010,
    Incompatible = 10020,

    // Credential and authorization errors (20000–20999)
    PermissionDenied = 20000,
    ConfigDisabled = 20010,
    MissingRefreshToken = 20020,
    OAuth2RefreshFailed = 20030,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,
    SyncAlreadyRunning = 30020,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    ConnectionTimeout = 40010,
    HttpResponseError = 40030,

    // Mail ingestion errors (50000–50999)
    ImapCommandFailed = 50000,
    ImapAuthenticationFailed = 50010,
    GmailApiCallFailed = 50020,
    UnsupportedPortal = 50030,
    LeadParseFailed = 50040,
    PropertyReferenceUnknown = 50050,

    // Listings API errors (60000–60999)
    ListingsApiFailed = 60000,
    ListingMappingFailed = 60010,

    // Internal system errors (70000–70999)
    InternalError = 70000,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter
            | ErrorCode::MissingConfiguration
            | ErrorCode::Incompatible => StatusCode::BAD_REQUEST,
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::ConfigDisabled
            | ErrorCode::MissingRefreshToken
            | ErrorCode::OAuth2RefreshFailed => StatusCode::FORBIDDEN,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists | ErrorCode::SyncAlreadyRunning => StatusCode::CONFLICT,
            ErrorCode::NetworkError
            | ErrorCode::ConnectionTimeout
            | ErrorCode::HttpResponseError
            | ErrorCode::ImapCommandFailed
            | ErrorCode::ImapAuthenticationFailed
            | ErrorCode::GmailApiCallFailed
            | ErrorCode::ListingsApiFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::UnsupportedPortal
            | ErrorCode::LeadParseFailed
            | ErrorCode::PropertyReferenceUnknown
            | ErrorCode::ListingMappingFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
