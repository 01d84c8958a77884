//! Lightstack Orchestrator
//!
//! Control plane for stacks provisioned by the `init.sh` script:
//! - API: authenticated HTTP endpoints (axum)
//! - Services: script protocol, background provisioning, reverse-proxy control
//! - Repository: in-memory job registry

pub mod api;
pub mod config;
pub mod repository;
pub mod service;
