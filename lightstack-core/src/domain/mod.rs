//! Core domain types
//!
//! These types represent the fundamental business entities and are shared
//! between the orchestrator (which owns the job registry) and the client.

pub mod job;
pub mod stack;
