// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::status::LeadGateStatus;
use poem::{handler, web::Json, IntoResponse};

#[handler]
pub async fn get_status() -> impl IntoResponse {
    Json(LeadGateStatus::get())
}
