//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services drive the provisioning script, the reverse proxy and the job
//! registry; the API layer only translates HTTP to service calls.

pub mod auth;
pub mod job;
pub mod process;
pub mod provision;
pub mod proxy;
pub mod script;
pub mod stack;

#[cfg(all(test, unix))]
pub(crate) mod testing;

// Re-export for convenience
pub use auth as auth_service;
pub use job as job_service;
pub use provision as provision_service;
pub use stack as stack_service;
