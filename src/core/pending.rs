//! FIFO queue of jobs waiting for capacity, and the admission scan over it.

use std::collections::VecDeque;

use crate::core::job::Job;
use crate::core::ResourceLedger;

/// Jobs that were accepted but have not started, in enqueue order.
pub(crate) struct PendingQueue<P, R> {
    jobs: VecDeque<Job<P, R>>,
}

impl<P, R> PendingQueue<P, R> {
    pub(crate) const fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    pub(crate) fn push_back(&mut self, job: Job<P, R>) {
        self.jobs.push_back(job);
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|job| job.id == id)
    }

    /// Remove a job by id, keeping the order of the others.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Job<P, R>> {
        let idx = self.jobs.iter().position(|job| job.id == id)?;
        self.jobs.remove(idx)
    }

    /// Take every pending job, e.g. on shutdown.
    pub(crate) fn drain(&mut self) -> Vec<Job<P, R>> {
        self.jobs.drain(..).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Job<P, R>> {
        self.jobs.iter()
    }

    /// Greedy admission scan.
    ///
    /// Walks the queue in FIFO order and reserves capacity for every job that
    /// fits, skipping the ones that do not. A large job at the head does not
    /// block smaller jobs behind it, so it can starve while small jobs keep
    /// arriving. Passes repeat until one admits nothing.
    pub(crate) fn admit(&mut self, ledger: &mut ResourceLedger) -> Vec<Job<P, R>> {
        let mut admitted = Vec::new();
        loop {
            let before = admitted.len();
            let mut idx = 0;
            while idx < self.jobs.len() {
                if ledger.try_reserve(self.jobs[idx].units) {
                    if let Some(job) = self.jobs.remove(idx) {
                        admitted.push(job);
                    }
                } else {
                    idx += 1;
                }
            }
            if admitted.len() == before {
                break;
            }
        }
        admitted
    }
}
