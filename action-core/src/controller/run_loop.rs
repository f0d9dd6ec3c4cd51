//! RunLoop: batched-update scheduler
//!
//! Coalesces every action triggered during one synchronous turn into a
//! single flush:
//! - FIFO queue, jobs scheduled while flushing join the same flush
//! - a failing job stops the flush and leaves the rest queued
//! - per-flush job limit guards against jobs that keep re-scheduling

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::{debug, error, trace};

use crate::config::SchedulerConfig;
use crate::controller::traits::{Job, Scheduler};
use crate::error::{ActionError, ActionResult};

/// Run loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLoopStats {
    pub jobs_scheduled: u64,
    pub jobs_executed: u64,
    pub flushes: u64,
    pub pending: usize,
}

pub struct RunLoop {
    queue: RefCell<VecDeque<Job>>,
    max_jobs_per_flush: usize,
    flushing: Cell<bool>,
    jobs_scheduled: Cell<u64>,
    jobs_executed: Cell<u64>,
    flushes: Cell<u64>,
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl RunLoop {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            max_jobs_per_flush: config.max_jobs_per_flush,
            flushing: Cell::new(false),
            jobs_scheduled: Cell::new(0),
            jobs_executed: Cell::new(0),
            flushes: Cell::new(0),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }

    /// Schedule `job` and flush immediately.
    pub fn run(&self, job: impl FnOnce() -> ActionResult<()> + 'static) -> ActionResult<usize> {
        self.schedule(Box::new(job));
        self.flush()
    }

    /// End of turn: run queued jobs in order until the queue is empty.
    ///
    /// A nested call from inside a job returns `Ok(0)`; the outer flush
    /// picks up whatever the job queued.
    pub fn flush(&self) -> ActionResult<usize> {
        if self.flushing.replace(true) {
            return Ok(0);
        }

        let result = self.drain();
        self.flushing.set(false);
        self.flushes.set(self.flushes.get() + 1);

        match &result {
            Ok(executed) if *executed > 0 => debug!(executed, "run loop flushed"),
            Ok(_) => {}
            Err(e) => error!(pending = self.pending(), "run loop flush aborted: {e}"),
        }

        result
    }

    fn drain(&self) -> ActionResult<usize> {
        let mut executed = 0usize;

        loop {
            // Release the borrow before running: jobs may schedule more work.
            let Some(job) = self.queue.borrow_mut().pop_front() else {
                return Ok(executed);
            };

            if executed == self.max_jobs_per_flush {
                self.queue.borrow_mut().push_front(job);
                return Err(ActionError::FlushOverflow {
                    limit: self.max_jobs_per_flush,
                });
            }

            executed += 1;
            self.jobs_executed.set(self.jobs_executed.get() + 1);
            job()?;
        }
    }

    pub fn stats(&self) -> RunLoopStats {
        RunLoopStats {
            jobs_scheduled: self.jobs_scheduled.get(),
            jobs_executed: self.jobs_executed.get(),
            flushes: self.flushes.get(),
            pending: self.pending(),
        }
    }
}

impl Scheduler for RunLoop {
    fn schedule(&self, job: Job) {
        self.queue.borrow_mut().push_back(job);
        self.jobs_scheduled.set(self.jobs_scheduled.get() + 1);
        trace!(pending = self.pending(), "job scheduled");
    }
}
