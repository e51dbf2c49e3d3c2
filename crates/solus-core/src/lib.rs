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

//! # Solus Core
//!
//! Instance-lifecycle governor that enforces single-instance policies on
//! arbitrary types, plus the small runtime utilities built around it.

#![warn(missing_docs)]

pub mod governor;
pub mod utils;
pub mod worker;

pub use governor::{
    Constructible, Governed, GovernorError, GovernorResult, Instance, Lifecycle, PolicyRegistry,
    SingletonPolicy, TypeKey, WeakHandle,
};
pub use utils::timer::Stopwatch;
pub use worker::{PeriodicWorker, WorkerConfig, WorkerStep};
