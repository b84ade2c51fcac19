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

//! Pausable periodic background thread
//!
//! Runs a callback on a dedicated thread at a fixed interval. The thread
//! can be paused and resumed from any thread; `finish` is terminal and
//! joins the thread. Used for background housekeeping (statistics refresh,
//! cache eviction), not by the join core itself.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct ControlFlags {
    paused: bool,
    shutdown: bool,
}

struct LoopState {
    flags: Mutex<ControlFlags>,
    signal: Condvar,
}

/// A periodic background thread that can be paused, resumed, and finished
///
/// - `resume` after `pause` is idempotent; both may be called from any thread.
/// - `finish` is terminal: it stops the loop and joins the thread. Dropping
///   the handle finishes implicitly.
pub struct PausableLoopThread {
    state: Arc<LoopState>,
    thread: Option<JoinHandle<()>>,
}

impl PausableLoopThread {
    /// Spawn the loop thread
    ///
    /// `loop_func` receives the iteration counter, starting at zero. With a
    /// non-zero interval the thread sleeps before every iteration, so
    /// `finish` may block for up to one interval.
    pub fn new<F>(interval: Duration, mut loop_func: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let state = Arc::new(LoopState {
            flags: Mutex::new(ControlFlags::default()),
            signal: Condvar::new(),
        });

        let thread_state = Arc::clone(&state);
        let thread = thread::spawn(move || {
            let mut counter: u64 = 0;
            loop {
                if !interval.is_zero() {
                    thread::sleep(interval);
                }
                {
                    let mut flags = thread_state.flags.lock();
                    if flags.shutdown {
                        return;
                    }
                    while flags.paused && !flags.shutdown {
                        thread_state.signal.wait(&mut flags);
                    }
                    if flags.shutdown {
                        return;
                    }
                }
                loop_func(counter);
                counter += 1;
            }
        });

        Self {
            state,
            thread: Some(thread),
        }
    }

    /// Pause the loop before its next iteration
    pub fn pause(&self) {
        self.state.flags.lock().paused = true;
    }

    /// Resume a paused loop; a no-op when not paused
    pub fn resume(&self) {
        let mut flags = self.state.flags.lock();
        flags.paused = false;
        self.state.signal.notify_one();
    }

    /// Stop the loop and join the thread
    pub fn finish(&mut self) {
        {
            let mut flags = self.state.flags.lock();
            flags.paused = false;
            flags.shutdown = true;
            self.state.signal.notify_one();
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PausableLoopThread {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn wait_until(predicate: impl Fn() -> bool) -> bool {
        for _ in 0..500 {
            if predicate() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_loop_runs_and_counts() {
        let ticks = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&ticks);
        let mut looper = PausableLoopThread::new(Duration::from_millis(1), move |counter| {
            // Counter is the iteration number handed to the callback
            seen.store(counter + 1, Ordering::SeqCst);
        });
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) >= 3));
        looper.finish();
    }

    #[test]
    fn test_pause_stops_iterations() {
        let ticks = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&ticks);
        let mut looper = PausableLoopThread::new(Duration::from_millis(1), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) >= 1));

        looper.pause();
        // Allow an in-flight iteration to drain, then the count must settle
        thread::sleep(Duration::from_millis(20));
        let settled = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), settled);

        looper.resume();
        // Resume twice: idempotent
        looper.resume();
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) > settled));
        looper.finish();
    }

    #[test]
    fn test_finish_joins() {
        let ticks = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&ticks);
        let mut looper = PausableLoopThread::new(Duration::from_millis(1), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        looper.finish();
        let after_finish = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), after_finish);
    }
}
