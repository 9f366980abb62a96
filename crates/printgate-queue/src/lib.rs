//! # printgate-queue
//!
//! In-memory print queues for the PrintGate job service.
//!
//! One ordered queue per printer, created on first submission, with
//! promotion of any queued job. The engine also owns the running/stopped
//! service state and a last-write-wins settings table.
//!
//! The engine performs no authorization of its own; callers gate every
//! operation before invoking it.
//!
//! ```
//! use printgate_queue::PrintQueueEngine;
//!
//! let engine = PrintQueueEngine::default();
//! engine.submit("lobby", "report.pdf").unwrap();
//! let job = engine.submit("lobby", "slides.pdf").unwrap();
//! engine.promote("lobby", job.id).unwrap();
//!
//! let queue = engine.list("lobby").unwrap();
//! assert_eq!(queue[0].filename, "slides.pdf");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod job;

pub use config::QueueConfig;
pub use engine::{PrintQueueEngine, ResourceStatus, ServiceState};
pub use error::QueueError;
pub use job::{PrintJob, PromoteTarget};

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
