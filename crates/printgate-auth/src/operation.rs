//! Gated operations.
//!
//! Policy catalogs grant permissions by these names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An operation that must be granted by the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Add a job to a printer's queue.
    Submit,
    /// Read a printer's queue.
    ListQueue,
    /// Reposition a job within a printer's queue.
    Promote,
    /// Start the print service.
    Start,
    /// Stop the print service.
    Stop,
    /// Stop, clear every queue and start again.
    Restart,
    /// Read the status of a printer.
    Status,
    /// Read a configuration parameter.
    ReadConfig,
    /// Write a configuration parameter.
    SetConfig,
}

impl Operation {
    /// Every gated operation.
    pub const ALL: [Operation; 9] = [
        Self::Submit,
        Self::ListQueue,
        Self::Promote,
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::Status,
        Self::ReadConfig,
        Self::SetConfig,
    ];

    /// Returns the permission name used in policy catalogs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::ListQueue => "listQueue",
            Self::Promote => "promote",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Status => "status",
            Self::ReadConfig => "readConfig",
            Self::SetConfig => "setConfig",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}
