//! The print queue engine.
//!
//! # Locking
//!
//! - Each printer's queue has its own mutex. A queue lock is never held while
//!   another queue's lock is taken, so work on one printer never waits on
//!   another.
//! - The service state doubles as a lifecycle gate. Queue operations hold it
//!   shared; `start`, `stop` and `restart` hold it exclusively. A restart
//!   therefore lands strictly before or after any in-flight queue operation.
//! - The settings table has its own lock and no ordering with the queues.
//!
//! No lock is held across an await point; every operation is synchronous.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::QueueResult;
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::job::{PrintJob, PromoteTarget, ResourceQueue};

/// Whether the service accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
}

impl ServiceState {
    /// Returns `true` if submissions are accepted.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Status report for one printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    pub resource: String,
    pub running: bool,
    pub queue_length: usize,
}

/// Per-printer job queues, service state and the runtime settings table.
pub struct PrintQueueEngine {
    queues: DashMap<String, Arc<Mutex<ResourceQueue>>>,
    lifecycle: RwLock<ServiceState>,
    settings: RwLock<HashMap<String, String>>,
    promote_to: PromoteTarget,
}

impl PrintQueueEngine {
    /// Creates an engine from configuration.
    #[must_use]
    pub fn new(config: &QueueConfig) -> Self {
        let state = if config.start_running {
            ServiceState::Running
        } else {
            ServiceState::Stopped
        };
        Self {
            queues: DashMap::new(),
            lifecycle: RwLock::new(state),
            settings: RwLock::new(config.settings.clone().into_iter().collect()),
            promote_to: config.promote_to,
        }
    }

    /// Where `promote` moves a job.
    #[must_use]
    pub fn promote_target(&self) -> PromoteTarget {
        self.promote_to
    }

    // -------------------------------------------------------------------------
    // Queue operations
    // -------------------------------------------------------------------------

    /// Appends a job to the printer's queue, creating the queue on first use.
    ///
    /// # Errors
    ///
    /// Returns `ServiceStopped` while the service is stopped.
    pub fn submit(&self, resource: &str, filename: &str) -> QueueResult<PrintJob> {
        let state = self.lifecycle.read();
        if !state.is_running() {
            tracing::debug!(printer = %resource, filename = %filename, "Submission refused; service stopped");
            return Err(QueueError::ServiceStopped);
        }

        let queue = self.queue_or_create(resource);
        let job = queue.lock().push(filename);
        tracing::info!(printer = %resource, job_id = job.id, filename = %filename, "Print job queued");
        Ok(job)
    }

    /// Returns a snapshot of the printer's queue, next-served first.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if nothing was ever submitted to the printer
    /// since startup or the last restart.
    pub fn list(&self, resource: &str) -> QueueResult<Vec<PrintJob>> {
        let _gate = self.lifecycle.read();
        let queue = self
            .queue(resource)
            .ok_or_else(|| QueueError::resource_not_found(resource))?;
        let jobs = queue.lock().snapshot();
        Ok(jobs)
    }

    /// Moves a job to the configured promotion target.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown printer and `JobNotFound` for
    /// an unknown job. The queue is unchanged on error.
    pub fn promote(&self, resource: &str, job_id: u64) -> QueueResult<()> {
        let _gate = self.lifecycle.read();
        let queue = self
            .queue(resource)
            .ok_or_else(|| QueueError::resource_not_found(resource))?;

        if !queue.lock().promote(job_id, self.promote_to) {
            return Err(QueueError::job_not_found(resource, job_id));
        }
        tracing::info!(printer = %resource, job_id, target = ?self.promote_to, "Print job promoted");
        Ok(())
    }

    /// Reports the service state and the printer's queue length.
    ///
    /// Printers that have no queue report a length of zero.
    #[must_use]
    pub fn status(&self, resource: &str) -> ResourceStatus {
        let state = self.lifecycle.read();
        let queue_length = self.queue(resource).map_or(0, |queue| queue.lock().len());
        ResourceStatus {
            resource: resource.to_string(),
            running: state.is_running(),
            queue_length,
        }
    }

    /// Names of every printer with a queue, sorted.
    #[must_use]
    pub fn resources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.iter().map(|entry| entry.key().clone()).collect();
        names.sort_unstable();
        names
    }

    fn queue(&self, resource: &str) -> Option<Arc<Mutex<ResourceQueue>>> {
        self.queues.get(resource).map(|entry| Arc::clone(entry.value()))
    }

    fn queue_or_create(&self, resource: &str) -> Arc<Mutex<ResourceQueue>> {
        if let Some(queue) = self.queue(resource) {
            return queue;
        }
        let entry = self.queues.entry(resource.to_string()).or_insert_with(|| {
            tracing::debug!(printer = %resource, "Created print queue");
            Arc::default()
        });
        Arc::clone(entry.value())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Current service state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        *self.lifecycle.read()
    }

    /// Returns `true` if submissions are accepted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Sets the service state.
    pub fn set_running(&self, running: bool) {
        let next = if running {
            ServiceState::Running
        } else {
            ServiceState::Stopped
        };
        let mut state = self.lifecycle.write();
        if *state != next {
            tracing::info!(from = ?*state, to = ?next, "Print service state changed");
        }
        *state = next;
    }

    /// Starts accepting submissions.
    pub fn start(&self) {
        self.set_running(true);
    }

    /// Stops accepting submissions. Queued jobs are kept.
    pub fn stop(&self) {
        self.set_running(false);
    }

    /// Stops, drops every queue, and runs again, as one atomic step.
    pub fn restart(&self) {
        let mut state = self.lifecycle.write();
        *state = ServiceState::Stopped;
        let cleared = self.queues.len();
        self.queues.clear();
        *state = ServiceState::Running;
        tracing::info!(cleared_queues = cleared, "Print service restarted");
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Reads a runtime setting.
    ///
    /// # Errors
    ///
    /// Returns `ConfigKeyNotFound` if the key was never set.
    pub fn read_config(&self, key: &str) -> QueueResult<String> {
        self.settings
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| QueueError::config_key_not_found(key))
    }

    /// Writes a runtime setting. Last write wins.
    pub fn set_config(&self, key: &str, value: &str) {
        self.settings.write().insert(key.to_string(), value.to_string());
        tracing::info!(key = %key, value = %value, "Configuration updated");
    }
}

impl Default for PrintQueueEngine {
    fn default() -> Self {
        Self::new(&QueueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn ids(jobs: &[PrintJob]) -> Vec<u64> {
        jobs.iter().map(|job| job.id).collect()
    }

    #[test]
    fn test_submit_then_list_shows_job_at_tail() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a.pdf").unwrap();
        let job = engine.submit("p1", "b.pdf").unwrap();

        let jobs = engine.list("p1").unwrap();
        assert_eq!(jobs.last(), Some(&job));
        assert_eq!(ids(&jobs), vec![1, 2]);
    }

    #[test]
    fn test_list_unknown_printer() {
        let engine = PrintQueueEngine::default();
        assert_eq!(
            engine.list("nowhere"),
            Err(QueueError::resource_not_found("nowhere"))
        );
    }

    #[test]
    fn test_submit_while_stopped() {
        let engine = PrintQueueEngine::default();
        engine.stop();
        assert_eq!(engine.submit("p1", "a.pdf"), Err(QueueError::ServiceStopped));
        assert!(engine.resources().is_empty());

        engine.start();
        assert!(engine.submit("p1", "a.pdf").is_ok());
    }

    #[test]
    fn test_stopped_service_still_serves_reads() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a.pdf").unwrap();
        engine.stop();

        assert_eq!(engine.list("p1").unwrap().len(), 1);
        assert!(engine.promote("p1", 1).is_ok());
        assert!(!engine.status("p1").running);
    }

    #[test]
    fn test_promote_moves_exactly_one_job() {
        let engine = PrintQueueEngine::default();
        for file in ["a", "b", "c", "d"] {
            engine.submit("p1", file).unwrap();
        }
        engine.promote("p1", 3).unwrap();

        let jobs = engine.list("p1").unwrap();
        assert_eq!(ids(&jobs), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_promote_to_back() {
        let engine = PrintQueueEngine::new(&QueueConfig {
            promote_to: PromoteTarget::Back,
            ..Default::default()
        });
        for file in ["a", "b", "c"] {
            engine.submit("p1", file).unwrap();
        }
        engine.promote("p1", 1).unwrap();
        assert_eq!(ids(&engine.list("p1").unwrap()), vec![2, 3, 1]);
    }

    #[test]
    fn test_promote_errors_leave_queue_unchanged() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a").unwrap();
        engine.submit("p1", "b").unwrap();
        let before = engine.list("p1").unwrap();

        assert_eq!(
            engine.promote("p1", 42),
            Err(QueueError::job_not_found("p1", 42))
        );
        assert_eq!(
            engine.promote("p2", 1),
            Err(QueueError::resource_not_found("p2"))
        );
        assert_eq!(engine.list("p1").unwrap(), before);
    }

    #[test]
    fn test_ids_stay_unique_after_promote() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a").unwrap();
        engine.submit("p1", "b").unwrap();
        engine.promote("p1", 2).unwrap();
        let job = engine.submit("p1", "c").unwrap();
        assert_eq!(job.id, 3);
    }

    #[test]
    fn test_restart_clears_queues_and_runs() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a").unwrap();
        engine.submit("p2", "b").unwrap();
        engine.stop();

        engine.restart();

        assert!(engine.is_running());
        assert!(engine.resources().is_empty());
        assert_eq!(engine.status("p1").queue_length, 0);
        assert!(engine.list("p1").is_err());
        assert_eq!(engine.submit("p1", "c").unwrap().id, 1);
    }

    #[test]
    fn test_status() {
        let engine = PrintQueueEngine::default();
        engine.submit("p1", "a").unwrap();
        engine.submit("p1", "b").unwrap();

        assert_eq!(
            engine.status("p1"),
            ResourceStatus {
                resource: "p1".to_string(),
                running: true,
                queue_length: 2,
            }
        );
        assert_eq!(engine.status("unseen").queue_length, 0);
    }

    #[test]
    fn test_config_table() {
        let engine = PrintQueueEngine::default();
        assert_eq!(
            engine.read_config("paper"),
            Err(QueueError::config_key_not_found("paper"))
        );
        engine.set_config("paper", "A4");
        engine.set_config("paper", "Letter");
        assert_eq!(engine.read_config("paper").unwrap(), "Letter");
    }

    #[test]
    fn test_initial_settings_and_state() {
        let mut config = QueueConfig {
            start_running: false,
            ..Default::default()
        };
        config.settings.insert("toner".to_string(), "low".to_string());
        let engine = PrintQueueEngine::new(&config);

        assert_eq!(engine.state(), ServiceState::Stopped);
        assert_eq!(engine.read_config("toner").unwrap(), "low");
    }

    #[test]
    fn test_held_queue_lock_does_not_block_other_printer() {
        let engine = Arc::new(PrintQueueEngine::default());
        engine.submit("A", "a").unwrap();

        let queue_a = engine.queue("A").unwrap();
        let _held = queue_a.lock();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let job = engine.submit("B", "b").unwrap();
                tx.send(job).unwrap();
            })
        };

        let job = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("submit to B must not wait on A's lock");
        assert_eq!(job.id, 1);
        worker.join().unwrap();
    }
}
