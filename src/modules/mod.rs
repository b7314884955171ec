// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod common;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod ingest;
pub mod lead;
pub mod ledger;
pub mod listings;
pub mod logger;
pub mod parser;
pub mod property;
pub mod rest;
pub mod scheduler;
pub mod settings;
pub mod sync;
pub mod tasks;
pub mod transport;
pub mod utils;
pub mod worker;
