// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        context::Initialize,
        error::{code::ErrorCode, LeadGateResult},
    },
    raise_error,
};

pub struct LeadGateTls;

impl Initialize for LeadGateTls {
    async fn initialize() -> LeadGateResult<()> {
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
            .map_err(|_| {
                raise_error!(
                    "failed to set crypto provider".into(),
                    ErrorCode::InternalError
                )
            })
    }
}
