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

use std::time::{Duration, Instant};

/// A monotonic stopwatch that can be started, stopped and restarted.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    start_time: Option<Instant>,
}

impl Stopwatch {
    /// Creates a running stopwatch.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
        }
    }

    /// Creates a stopwatch that has not been started.
    #[inline]
    pub fn idle() -> Self {
        Self { start_time: None }
    }

    /// (Re)starts the stopwatch from zero.
    #[inline]
    pub fn restart(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stops the stopwatch and returns the measured span.
    ///
    /// Returns `None` if the stopwatch was not running.
    #[inline]
    pub fn stop(&mut self) -> Option<Duration> {
        self.start_time.take().map(|start| start.elapsed())
    }

    /// Returns `true` between a start and the following stop.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    /// Returns the time elapsed since the stopwatch was started, or `None` if
    /// it is not running.
    #[inline]
    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|start| start.elapsed())
    }

    /// Elapsed time in whole milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.elapsed().map(|d| d.as_millis() as u64)
    }

    /// Elapsed time in whole microseconds.
    #[inline]
    pub fn elapsed_us(&self) -> Option<u64> {
        self.elapsed().map(|d| d.as_micros() as u64)
    }

    /// Elapsed time in seconds.
    #[inline]
    pub fn elapsed_secs_f64(&self) -> Option<f64> {
        self.elapsed().map(|d| d.as_secs_f64())
    }
}
