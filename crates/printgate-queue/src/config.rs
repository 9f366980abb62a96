//! Queue engine configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::job::PromoteTarget;

/// Queue engine configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [queue]
/// promote_to = "front"
/// start_running = true
///
/// [queue.settings]
/// paper_size = "A4"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Where `promote` moves a job.
    pub promote_to: PromoteTarget,

    /// Whether the service accepts submissions right after startup.
    pub start_running: bool,

    /// Initial contents of the runtime settings table.
    pub settings: BTreeMap<String, String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            promote_to: PromoteTarget::Front,
            start_running: true,
            settings: BTreeMap::new(),
        }
    }
}
