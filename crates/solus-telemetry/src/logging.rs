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

//! Logger bootstrap for binaries built on the `log` facade.

use env_logger::{Builder, Env};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global logger with [`DEFAULT_FILTER`].
///
/// Returns `false` if a logger was already installed.
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Installs the global logger, using `default_filter` unless `RUST_LOG`
/// overrides it.
pub fn init_with_filter(default_filter: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_logger() {
        init_with_filter("debug");
        assert!(!init());
    }
}
