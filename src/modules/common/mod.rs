// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod rustls;
pub mod signal;
