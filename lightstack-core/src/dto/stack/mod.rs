//! Stack DTOs

use serde::{Deserialize, Serialize};

/// Response to a completed stack removal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackRemoved {
    pub message: String,
}
