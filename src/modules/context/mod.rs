// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::LeadGateResult;

pub mod status;

pub trait Initialize {
    async fn initialize() -> LeadGateResult<()>;
}

pub trait LeadGateTask {
    fn start();
}
