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

//! Elapsed-time tracking.
//!
//! ```
//! use solus_telemetry::tracker::{MemorySink, TimeFormat, TimeTracker, TrackerConfig, Verbosity};
//!
//! let sink = MemorySink::new();
//! let mut tracker = TimeTracker::from_config(TrackerConfig {
//!     format: TimeFormat::Sec,
//!     verbosity: Verbosity::Total,
//!     rounding: 3,
//! })
//! .unwrap()
//! .with_sink(sink.clone());
//!
//! {
//!     let _scope = tracker.scope();
//!     // measured work
//! }
//! assert!(sink.contents().starts_with("Elapsed time "));
//! ```

mod config;
mod error;
mod format;
mod sink;
mod time_tracker;

pub use self::config::{TrackerConfig, MAX_ROUNDING};
pub use self::error::TrackerError;
pub use self::format::{TimeFormat, Verbosity};
pub use self::sink::MemorySink;
pub use self::time_tracker::{TimeTracker, TrackerScope};
