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

use super::error::TrackerError;
use super::format::{TimeFormat, Verbosity};
use serde::{Deserialize, Serialize};

/// Most decimal places an `f64` can meaningfully carry.
pub const MAX_ROUNDING: u32 = 15;

/// Configuration for a [`TimeTracker`](super::TimeTracker).
///
/// Can be written in RON; missing fields take their defaults:
///
/// ```text
/// (format: sec, verbosity: detailed, rounding: 3)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Unit of the accumulator and of printed values.
    pub format: TimeFormat,
    /// What is written when a measurement ends.
    pub verbosity: Verbosity,
    /// Decimal places kept when printing, from 1 to [`MAX_ROUNDING`].
    pub rounding: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            format: TimeFormat::Ms,
            verbosity: Verbosity::Silent,
            rounding: 2,
        }
    }
}

impl TrackerConfig {
    /// Parses and validates a RON configuration.
    pub fn from_ron(text: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the tracker relies on.
    pub fn validate(&self) -> Result<(), TrackerError> {
        check_rounding(self.rounding).map(|_| ())
    }
}

pub(crate) fn check_rounding(rounding: u32) -> Result<u32, TrackerError> {
    if (1..=MAX_ROUNDING).contains(&rounding) {
        Ok(rounding)
    } else {
        Err(TrackerError::InvalidRounding(rounding))
    }
}
