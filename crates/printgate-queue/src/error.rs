//! Queue engine error types.

/// Errors returned by queue engine operations.
///
/// Each variant has a stable [`code`](QueueError::code) so that clients can
/// tell a missing printer from a missing job from a stopped service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// No queue exists for the printer.
    #[error("No queue found for printer '{resource}'")]
    ResourceNotFound {
        /// The printer name.
        resource: String,
    },

    /// The printer's queue holds no job with this id.
    #[error("Job {job_id} not found in queue for printer '{resource}'")]
    JobNotFound {
        /// The printer name.
        resource: String,
        /// The requested job id.
        job_id: u64,
    },

    /// Submissions are refused while the service is stopped.
    #[error("Print service is not running")]
    ServiceStopped,

    /// The settings table has no value for the key.
    #[error("Configuration parameter '{key}' not found")]
    ConfigKeyNotFound {
        /// The requested key.
        key: String,
    },
}

impl QueueError {
    /// Creates a new `ResourceNotFound` error.
    #[must_use]
    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }

    /// Creates a new `JobNotFound` error.
    #[must_use]
    pub fn job_not_found(resource: impl Into<String>, job_id: u64) -> Self {
        Self::JobNotFound {
            resource: resource.into(),
            job_id,
        }
    }

    /// Creates a new `ConfigKeyNotFound` error.
    #[must_use]
    pub fn config_key_not_found(key: impl Into<String>) -> Self {
        Self::ConfigKeyNotFound { key: key.into() }
    }

    /// Returns `true` if the error names something that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. } | Self::JobNotFound { .. } | Self::ConfigKeyNotFound { .. }
        )
    }

    /// Returns the stable, machine-readable error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::JobNotFound { .. } => "job_not_found",
            Self::ServiceStopped => "service_stopped",
            Self::ConfigKeyNotFound { .. } => "config_key_not_found",
        }
    }
}
