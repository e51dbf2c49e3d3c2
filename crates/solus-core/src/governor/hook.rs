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

//! Destruction-side interception.

use super::instance::Slot;
use super::lifecycle::TeardownFn;
use super::registry::GovernedState;
use std::fmt;
use std::sync::Arc;

/// Runs when a constructed object is destroyed.
///
/// If the object was constructed for exactly the governed type, the policy
/// state is cleared first, so that a construction request issued from inside
/// the teardown already sees "no live instance". The captured teardown then
/// runs unconditionally.
pub struct DestructionHook<T> {
    state: Arc<GovernedState<T>>,
    teardown: Option<TeardownFn<T>>,
}

impl<T> DestructionHook<T> {
    pub(crate) fn new(state: Arc<GovernedState<T>>, teardown: Option<TeardownFn<T>>) -> Self {
        Self { state, teardown }
    }

    pub(crate) fn fire(&self, slot: &Slot<T>) {
        if slot.runtime_type() == self.state.governed {
            self.state.state.lock().on_destroy(slot);
            log::debug!("Destroyed governed instance of {}", self.state.governed);
        }
        if let Some(teardown) = &self.teardown {
            teardown(slot.value());
        }
    }
}

impl<T> fmt::Debug for DestructionHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestructionHook")
            .field("governed", &self.state.governed)
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}
