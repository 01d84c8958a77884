//! Repository Module
//!
//! State owned by the orchestrator. Jobs live in memory only and are lost
//! on restart.

pub mod job;

// Re-export for convenience
pub use job as job_repository;
