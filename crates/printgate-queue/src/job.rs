//! Print jobs and per-printer queues.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Where `promote` puts the chosen job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoteTarget {
    /// The job becomes the next one served.
    #[default]
    Front,
    /// The job is moved behind every other job.
    Back,
}

/// A job waiting in a printer's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    /// Position-derived id, unique within the queue's contents.
    pub id: u64,
    /// The submitted file.
    pub filename: String,
}

/// The ordered jobs of one printer. Index 0 is served next.
#[derive(Debug, Default)]
pub(crate) struct ResourceQueue {
    jobs: VecDeque<PrintJob>,
}

impl ResourceQueue {
    /// Appends a job at the tail. Its id is the new queue length.
    pub(crate) fn push(&mut self, filename: impl Into<String>) -> PrintJob {
        let job = PrintJob {
            id: self.jobs.len() as u64 + 1,
            filename: filename.into(),
        };
        self.jobs.push_back(job.clone());
        job
    }

    /// Moves the job with `job_id` to `target`. Returns `false`, leaving the
    /// queue untouched, if no such job exists.
    pub(crate) fn promote(&mut self, job_id: u64, target: PromoteTarget) -> bool {
        let Some(index) = self.jobs.iter().position(|job| job.id == job_id) else {
            return false;
        };
        let Some(job) = self.jobs.remove(index) else {
            return false;
        };
        match target {
            PromoteTarget::Front => self.jobs.push_front(job),
            PromoteTarget::Back => self.jobs.push_back(job),
        }
        true
    }

    pub(crate) fn snapshot(&self) -> Vec<PrintJob> {
        self.jobs.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }
}
