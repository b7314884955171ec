// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::utc_now;
use chrono::Local;
use poem_openapi::Object;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;

static START_AT: LazyLock<i64> = LazyLock::new(|| utc_now!());

/// Records the service start time. Called once during startup so that
/// `uptime_ms` is measured from process launch rather than first request.
pub fn mark_started() {
    LazyLock::force(&START_AT);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Object)]
pub struct LeadGateStatus {
    /// The service uptime in milliseconds since it started.
    pub uptime_ms: i64,
    /// The timezone in which the service is operating (e.g., "UTC" or "+02:00").
    pub timezone: String,
    /// The version of the LeadGate service currently running.
    pub version: String,
}

impl LeadGateStatus {
    pub fn get() -> Self {
        Self {
            uptime_ms: utc_now!() - *START_AT,
            timezone: Local::now().offset().to_string(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
