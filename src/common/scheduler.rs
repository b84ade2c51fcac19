// Copyright 2026 Stratum Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Task scheduling facade
//!
//! A thin schedule/wait interface over rayon's work-stealing pool. Callers
//! dispatch pure in-memory jobs and block on the whole batch; the barrier
//! consumes every handle, so no job outlives the caller even when one of
//! them fails.

use std::sync::mpsc;

use crate::core::{Error, Result};

/// Handle for one scheduled job
///
/// The handle owns the receiving end of the job's completion channel.
/// Dropping it without waiting detaches the job.
pub struct TaskHandle {
    completion: mpsc::Receiver<Result<()>>,
}

/// Dispatch a job onto the global worker pool
pub fn schedule<F>(job: F) -> TaskHandle
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let (sender, completion) = mpsc::channel();
    rayon::spawn(move || {
        // The barrier may have given up on this job; a closed channel is fine
        let _ = sender.send(job());
    });
    TaskHandle { completion }
}

/// Block until every scheduled job has completed
///
/// All handles are drained before any error is surfaced, so a failing job
/// never leaves siblings running behind the caller's back. The first error
/// in schedule order is returned.
pub fn wait_for(handles: Vec<TaskHandle>) -> Result<()> {
    let mut first_error: Option<Error> = None;
    for handle in handles {
        let outcome = handle.completion.recv().unwrap_or(Err(Error::WorkerLost));
        if let Err(error) = outcome {
            first_error.get_or_insert(error);
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_wait_for_runs_all_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<TaskHandle> = (0..16)
            .map(|_| {
                let counter = Arc::clone(&counter);
                schedule(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();
        wait_for(handles).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_wait_for_surfaces_first_error_after_joining_all() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                if i % 2 == 1 {
                    Err(Error::internal(format!("job {} failed", i)))
                } else {
                    Ok(())
                }
            }));
        }
        let err = wait_for(handles).unwrap_err();
        assert!(err.to_string().contains("failed"));
        // Every job ran to completion before the error surfaced
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
