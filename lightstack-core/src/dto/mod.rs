//! Data Transfer Objects for the HTTP API
//!
//! Lightweight bodies exchanged between the orchestrator and its clients
//! that have no life outside a single request.

pub mod auth;
pub mod job;
pub mod stack;
