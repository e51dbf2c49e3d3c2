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

use thiserror::Error;

/// Errors raised while configuring a tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Rounding must keep between 1 and 15 decimal places.
    #[error("rounding must be between 1 and 15, got {0}")]
    InvalidRounding(u32),

    /// Verbosity levels are 0, 1 or 2.
    #[error("verbosity must be 0, 1 or 2, got {0}")]
    InvalidVerbosity(u8),

    /// Not one of `ms`, `sec`, `min`, `hour`.
    #[error("unknown time format '{0}' (expected ms/sec/min/hour)")]
    UnknownFormat(String),

    /// The configuration text could not be parsed.
    #[error("invalid tracker configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
}
