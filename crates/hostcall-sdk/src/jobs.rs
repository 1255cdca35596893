//! Deferred work for the invoking thread
//!
//! Under [`ThreadPolicy::Pinned`](crate::ThreadPolicy::Pinned) only one
//! thread may invoke native routines. Other threads hand work to it through
//! this queue; the host drains it once per tick on the pinned thread.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

type Job = Box<dyn FnOnce() + Send + 'static>;

static QUEUE: Lazy<Mutex<VecDeque<Job>>> = Lazy::new(|| Mutex::new(VecDeque::new()));

/// Queue `job` to run on the next [`run_pending`] call
pub fn schedule(job: impl FnOnce() + Send + 'static) {
    QUEUE.lock().push_back(Box::new(job));
}

/// Run queued jobs on the calling thread until the queue is empty.
///
/// Jobs may schedule further jobs; those run in the same call. The queue lock
/// is released while each job runs. Returns the number of jobs run.
pub fn run_pending() -> usize {
    let mut ran = 0;
    loop {
        let next = QUEUE.lock().pop_front();
        let Some(job) = next else {
            break;
        };
        job();
        ran += 1;
    }
    if ran > 0 {
        tracing::trace!(jobs = ran, "ran pending jobs");
    }
    ran
}

/// Number of queued jobs
pub fn pending() -> usize {
    QUEUE.lock().len()
}
