//! Service layer for business logic
//!
//! The orchestrator shared by the HTTP API and the CLI.

mod link_service;

pub use link_service::*;
