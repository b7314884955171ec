// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod client;
pub mod mapper;
pub mod types;

pub use client::{ListingsApi, ListingsClient};
