// Copyright 2025 eraflo
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

//! A background thread that calls a task at a fixed interval.
//!
//! The loop sleeps for one interval, then calls the task, until either
//! [`PeriodicWorker::stop`] is called or the task reports
//! [`WorkerStep::Finished`]. A worker started with
//! [`PeriodicWorker::start_with_target`] only holds a [`Weak`] reference to its
//! target and finishes on its own once the target is dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Configuration for a [`PeriodicWorker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Name given to the worker thread.
    pub name: String,
    /// Time slept before each call.
    pub interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "solus-worker".to_string(),
            interval: Duration::from_secs(1),
        }
    }
}

/// What the loop should do after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStep {
    /// Keep calling.
    Continue,
    /// End the loop.
    Finished,
}

/// Errors returned when starting a worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread is still running.
    #[error("worker '{0}' is already running")]
    AlreadyRunning(String),
    /// The OS refused to spawn the thread.
    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

/// Calls a task on a dedicated thread at a fixed interval.
#[derive(Debug)]
pub struct PeriodicWorker {
    config: WorkerConfig,
    running: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PeriodicWorker {
    /// Creates a stopped worker.
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            ticks: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Creates a stopped worker with the default name and `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(WorkerConfig {
            interval,
            ..WorkerConfig::default()
        })
    }

    /// Starts calling `task` every interval.
    pub fn start<F>(&mut self, mut task: F) -> Result<(), WorkerError>
    where
        F: FnMut() -> WorkerStep + Send + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            return Err(WorkerError::AlreadyRunning(self.config.name.clone()));
        }
        // Reap a thread that already ended on its own.
        if let Some(handle) = self.handle.take() {
            reap(handle, &self.config.name);
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let ticks = Arc::clone(&self.ticks);
        let interval = self.config.interval;
        let name = self.config.name.clone();

        let spawned = thread::Builder::new()
            .name(self.config.name.clone())
            .spawn(move || {
                let flag = RunningFlag {
                    running,
                    name: name.clone(),
                };
                log::debug!("Worker '{}' started ({:?} interval).", name, interval);

                while sleep_unless_stopped(&flag.running, interval) {
                    ticks.fetch_add(1, Ordering::Relaxed);
                    log::trace!("Worker '{}' tick.", name);
                    if task() == WorkerStep::Finished {
                        log::debug!("Worker '{}' task finished.", name);
                        break;
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                Err(err.into())
            }
        }
    }

    /// Starts calling `task` on `target` every interval, without keeping the
    /// target alive. The loop ends once the target has been dropped.
    pub fn start_with_target<T, F>(&mut self, target: &Arc<T>, mut task: F) -> Result<(), WorkerError>
    where
        T: Send + Sync + 'static,
        F: FnMut(&T) + Send + 'static,
    {
        let target: Weak<T> = Arc::downgrade(target);
        let name = self.config.name.clone();
        self.start(move || match target.upgrade() {
            Some(target) => {
                task(&target);
                WorkerStep::Continue
            }
            None => {
                log::warn!("Worker '{}' target was dropped; stopping.", name);
                WorkerStep::Finished
            }
        })
    }

    /// Requests a stop and waits for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            reap(handle, &self.config.name);
        }
    }

    /// Returns `true` while the loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of calls made so far, across restarts.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// The worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

impl Drop for PeriodicWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clears the running flag when the worker thread exits, including by panic.
struct RunningFlag {
    running: Arc<AtomicBool>,
    name: String,
}

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if thread::panicking() {
            log::warn!("Worker '{}' task panicked; loop ended.", self.name);
        } else {
            log::debug!("Worker '{}' stopped.", self.name);
        }
    }
}

fn reap(handle: thread::JoinHandle<()>, name: &str) {
    if handle.join().is_err() {
        log::warn!("Worker '{}' thread ended with a panic.", name);
    }
}

/// Sleeps for `interval`, waking early on unpark to check the stop flag.
///
/// Returns `false` if a stop was requested.
fn sleep_unless_stopped(running: &AtomicBool, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}
