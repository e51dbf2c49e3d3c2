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

use super::config::{check_rounding, TrackerConfig};
use super::error::TrackerError;
use super::format::{TimeFormat, Verbosity};
use solus_core::utils::timer::Stopwatch;
use std::fmt;
use std::io::{self, Write};

/// Accumulates elapsed time over repeated measurements and reports it to a sink.
///
/// A measurement is either an explicit [`start`](Self::start) /
/// [`stop`](Self::stop) pair or a [`scope`](Self::scope) guard that stops when
/// dropped. Each measured span is converted into the current [`TimeFormat`]
/// and added to [`time`](Self::time).
pub struct TimeTracker {
    format: TimeFormat,
    verbosity: Verbosity,
    rounding: u32,
    total: f64,
    stopwatch: Stopwatch,
    sink: Box<dyn Write + Send>,
}

impl TimeTracker {
    /// Creates a silent millisecond tracker writing to stdout.
    pub fn new() -> Self {
        Self::build(TrackerConfig::default())
    }

    /// Creates a tracker from a validated configuration.
    pub fn from_config(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TrackerConfig) -> Self {
        Self {
            format: config.format,
            verbosity: config.verbosity,
            rounding: config.rounding,
            total: 0.0,
            stopwatch: Stopwatch::idle(),
            sink: Box::new(io::stdout()),
        }
    }

    /// Replaces the output sink, builder style.
    #[must_use]
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    /// Total accumulated time, in the current format.
    pub fn time(&self) -> f64 {
        self.total
    }

    /// Zeroes the accumulated time.
    pub fn reset(&mut self) {
        self.total = 0.0;
    }

    /// The current time format.
    pub fn format(&self) -> TimeFormat {
        self.format
    }

    /// Switches the format, rescaling the accumulated time into the new unit.
    pub fn set_format(&mut self, format: TimeFormat) {
        self.total *= self.format.seconds() / format.seconds();
        self.format = format;
    }

    /// The current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Sets what is written when a measurement ends.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Decimal places kept when printing.
    pub fn rounding(&self) -> u32 {
        self.rounding
    }

    /// Sets the printed precision, from 1 to
    /// [`MAX_ROUNDING`](super::MAX_ROUNDING) places.
    pub fn set_rounding(&mut self, rounding: u32) -> Result<(), TrackerError> {
        self.rounding = check_rounding(rounding)?;
        Ok(())
    }

    /// Replaces the output sink.
    pub fn set_sink(&mut self, sink: impl Write + Send + 'static) {
        self.sink = Box::new(sink);
    }

    /// Returns `true` while a measurement is open.
    pub fn is_measuring(&self) -> bool {
        self.stopwatch.is_running()
    }

    /// Opens a measurement. Starting twice restarts the current span.
    pub fn start(&mut self) {
        self.stopwatch.restart();
    }

    /// Closes the open measurement, accumulates it and reports it.
    ///
    /// Returns the span in the current format, or `None` if no measurement
    /// was open.
    pub fn stop(&mut self) -> Option<f64> {
        let Some(elapsed) = self.stopwatch.stop() else {
            log::warn!("TimeTracker::stop called without a matching start");
            return None;
        };

        let span = elapsed.as_secs_f64() / self.format.seconds();
        self.total += span;
        self.report(span);
        Some(span)
    }

    /// Opens a measurement that is closed when the returned guard drops.
    #[must_use = "the measurement ends as soon as the guard is dropped"]
    pub fn scope(&mut self) -> TrackerScope<'_> {
        self.start();
        TrackerScope { tracker: self }
    }

    fn report(&mut self, span: f64) {
        let total = round_to(self.total, self.rounding);
        let format = self.format;
        let written = match self.verbosity {
            Verbosity::Silent => Ok(()),
            Verbosity::Total => writeln!(self.sink, "Elapsed time {total} {format}"),
            Verbosity::Detailed => writeln!(
                self.sink,
                "Elapsed time: \nall:\n\t{total} {format}\ncurrent:\n\t{} {format}",
                round_to(span, self.rounding)
            ),
        };
        if let Err(e) = written.and_then(|_| self.sink.flush()) {
            log::warn!("TimeTracker failed to write its report: {e}");
        }
    }
}

impl Default for TimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Elapsed time {} {}",
            round_to(self.total, self.rounding),
            self.format
        )
    }
}

impl fmt::Debug for TimeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeTracker")
            .field("format", &self.format)
            .field("verbosity", &self.verbosity)
            .field("rounding", &self.rounding)
            .field("total", &self.total)
            .field("measuring", &self.is_measuring())
            .finish_non_exhaustive()
    }
}

/// Closes the tracker's measurement when dropped, including on early return
/// or unwinding.
pub struct TrackerScope<'a> {
    tracker: &'a mut TimeTracker,
}

impl Drop for TrackerScope<'_> {
    fn drop(&mut self) {
        self.tracker.stop();
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::sink::MemorySink;
    use std::thread;
    use std::time::Duration;

    fn tracker(format: TimeFormat, verbosity: Verbosity, sink: &MemorySink) -> TimeTracker {
        TimeTracker::from_config(TrackerConfig {
            format,
            verbosity,
            rounding: 3,
        })
        .unwrap()
        .with_sink(sink.clone())
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(2.54265, 3), 2.543);
        assert_eq!(round_to(1.0 / 3.0, 2), 0.33);
    }

    #[test]
    fn stop_accumulates_span() {
        let sink = MemorySink::new();
        let mut t = tracker(TimeFormat::Ms, Verbosity::Silent, &sink);

        t.start();
        thread::sleep(Duration::from_millis(20));
        let first = t.stop().unwrap();
        t.start();
        thread::sleep(Duration::from_millis(20));
        let second = t.stop().unwrap();

        assert!(first >= 20.0 && second >= 20.0);
        assert!((t.time() - (first + second)).abs() < 1e-9);
        assert!(sink.contents().is_empty(), "silent tracker writes nothing");
    }

    #[test]
    fn stop_without_start_is_noop() {
        let sink = MemorySink::new();
        let mut t = tracker(TimeFormat::Sec, Verbosity::Total, &sink);
        assert!(t.stop().is_none());
        assert_eq!(t.time(), 0.0);
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn set_format_rescales_total() {
        let mut t = TimeTracker::new();
        t.total = 2500.0;
        t.set_format(TimeFormat::Sec);
        assert!((t.time() - 2.5).abs() < 1e-9);
        t.set_format(TimeFormat::Min);
        assert!((t.time() - 2.5 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn set_rounding_rejects_zero() {
        let mut t = TimeTracker::new();
        assert!(matches!(
            t.set_rounding(0),
            Err(TrackerError::InvalidRounding(0))
        ));
        assert_eq!(t.rounding(), 2);
        t.set_rounding(5).unwrap();
        assert_eq!(t.rounding(), 5);
    }

    #[test]
    fn set_rounding_rejects_overflowing_precision() {
        let mut t = TimeTracker::new();
        for rounding in [16, 309, u32::MAX] {
            assert!(matches!(
                t.set_rounding(rounding),
                Err(TrackerError::InvalidRounding(r)) if r == rounding
            ));
        }
        t.set_rounding(15).unwrap();
        t.total = 1.25;
        assert_eq!(t.to_string(), "Elapsed time 1.25 ms\n");
    }

    #[test]
    fn display_renders_total_line() {
        let mut t = TimeTracker::new();
        t.total = 2542.653081;
        t.set_rounding(5).unwrap();
        assert_eq!(t.to_string(), "Elapsed time 2542.65308 ms\n");
    }

    #[test]
    fn reset_zeroes_total() {
        let mut t = TimeTracker::new();
        t.total = 12.0;
        t.reset();
        assert_eq!(t.time(), 0.0);
    }

    #[test]
    fn scope_stops_on_drop() {
        let sink = MemorySink::new();
        let mut t = tracker(TimeFormat::Ms, Verbosity::Total, &sink);
        {
            let _guard = t.scope();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!t.is_measuring());
        assert!(t.time() >= 5.0);
        let out = sink.contents();
        assert!(out.starts_with("Elapsed time "));
        assert!(out.ends_with(" ms\n"));
    }
}
