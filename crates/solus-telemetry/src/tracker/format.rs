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

//! Time units and verbosity levels for the [`TimeTracker`](super::TimeTracker).

use super::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The unit accumulated and printed by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// Milliseconds.
    #[default]
    Ms,
    /// Seconds.
    Sec,
    /// Minutes.
    Min,
    /// Hours.
    Hour,
}

impl TimeFormat {
    /// Length of one unit, in seconds.
    pub fn seconds(&self) -> f64 {
        match self {
            TimeFormat::Ms => 0.001,
            TimeFormat::Sec => 1.0,
            TimeFormat::Min => 60.0,
            TimeFormat::Hour => 3600.0,
        }
    }

    /// Short name printed after values.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::Ms => "ms",
            TimeFormat::Sec => "sec",
            TimeFormat::Min => "min",
            TimeFormat::Hour => "hour",
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(TimeFormat::Ms),
            "sec" => Ok(TimeFormat::Sec),
            "min" => Ok(TimeFormat::Min),
            "hour" => Ok(TimeFormat::Hour),
            other => Err(TrackerError::UnknownFormat(other.to_string())),
        }
    }
}

/// How much a tracker writes to its sink when a measurement ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Write nothing.
    #[default]
    Silent,
    /// Write the accumulated total.
    Total,
    /// Write the accumulated total and the last span.
    Detailed,
}

impl TryFrom<u8> for Verbosity {
    type Error = TrackerError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Silent),
            1 => Ok(Verbosity::Total),
            2 => Ok(Verbosity::Detailed),
            other => Err(TrackerError::InvalidVerbosity(other)),
        }
    }
}
