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

//! Single-instance policies and the per-type state they act on.
//!
//! Every policy splits its decision in two, following the two construction
//! phases: `on_construct` chooses between allocating and reusing, and
//! `on_initialize` chooses between running and skipping the initializer.
//! `on_destroy` re-arms the state when the tracked object goes away.
//!
//! | Policy          | Second request while alive  | Initializer on reuse |
//! |-----------------|-----------------------------|----------------------|
//! | `Hard`          | `DuplicateInstance` error   | n/a                  |
//! | `SoftReuseInit` | returns the live instance   | runs again           |
//! | `SoftSkipInit`  | returns the live instance   | skipped              |

use super::error::{GovernorError, GovernorResult};
use super::instance::{Instance, Slot};
use super::weak::WeakHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which single-instance rule a governed type follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingletonPolicy {
    /// At most one live instance; a second request is an error.
    Hard,
    /// Reuse the live instance and run the initializer on every request.
    SoftReuseInit,
    /// Reuse the live instance and run the initializer only the first time.
    SoftSkipInit,
}

impl SingletonPolicy {
    /// Returns the kebab-case name used in logs and configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SingletonPolicy::Hard => "hard",
            SingletonPolicy::SoftReuseInit => "soft-reuse-init",
            SingletonPolicy::SoftSkipInit => "soft-skip-init",
        }
    }
}

impl fmt::Display for SingletonPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the construction phase.
pub(crate) enum ConstructDecision<T> {
    /// Hand out the live instance.
    Reuse(Instance<T>),
    /// Call the original allocate.
    Allocate,
}

/// Liveness state kept once per governed type.
pub enum PolicyState<T> {
    /// State of the hard policy.
    Hard {
        /// Set between a successful allocation and the instance's destruction.
        has_live_instance: bool,
    },
    /// State of the reuse-and-reinitialize policy.
    SoftReuseInit {
        /// Observation of the last allocated instance.
        weak_handle: Option<WeakHandle<T>>,
    },
    /// State of the reuse-and-skip-initializer policy.
    SoftSkipInit {
        /// Observation of the last allocated instance.
        weak_handle: Option<WeakHandle<T>>,
        /// Whether the tracked instance has been initialized.
        initialized: bool,
    },
}

impl<T> PolicyState<T> {
    /// The state of `policy` with no instance tracked.
    #[must_use]
    pub fn empty(policy: SingletonPolicy) -> Self {
        match policy {
            SingletonPolicy::Hard => PolicyState::Hard {
                has_live_instance: false,
            },
            SingletonPolicy::SoftReuseInit => PolicyState::SoftReuseInit { weak_handle: None },
            SingletonPolicy::SoftSkipInit => PolicyState::SoftSkipInit {
                weak_handle: None,
                initialized: false,
            },
        }
    }

    /// The policy this state belongs to.
    #[must_use]
    pub fn policy(&self) -> SingletonPolicy {
        match self {
            PolicyState::Hard { .. } => SingletonPolicy::Hard,
            PolicyState::SoftReuseInit { .. } => SingletonPolicy::SoftReuseInit,
            PolicyState::SoftSkipInit { .. } => SingletonPolicy::SoftSkipInit,
        }
    }

    /// Returns `true` if an instance is currently tracked as alive.
    #[must_use]
    pub fn has_live_instance(&self) -> bool {
        match self {
            PolicyState::Hard { has_live_instance } => *has_live_instance,
            PolicyState::SoftReuseInit { weak_handle }
            | PolicyState::SoftSkipInit { weak_handle, .. } => {
                weak_handle.as_ref().is_some_and(WeakHandle::is_alive)
            }
        }
    }

    /// Returns `true` if nothing is tracked at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            PolicyState::Hard { has_live_instance } => !*has_live_instance,
            PolicyState::SoftReuseInit { weak_handle } => weak_handle.is_none(),
            PolicyState::SoftSkipInit {
                weak_handle,
                initialized,
            } => weak_handle.is_none() && !*initialized,
        }
    }

    /// The live instance, for the soft policies.
    pub(crate) fn current(&self) -> Option<Instance<T>> {
        match self {
            PolicyState::Hard { .. } => None,
            PolicyState::SoftReuseInit { weak_handle }
            | PolicyState::SoftSkipInit { weak_handle, .. } => {
                weak_handle.as_ref().and_then(WeakHandle::resolve)
            }
        }
    }

    /// Decides between allocating and reusing.
    ///
    /// Under the hard policy the live flag is claimed here, before the
    /// allocation runs; [`on_allocation_failed`](Self::on_allocation_failed)
    /// releases it again.
    pub(crate) fn on_construct(
        &mut self,
        type_name: &'static str,
    ) -> GovernorResult<ConstructDecision<T>> {
        match self {
            PolicyState::Hard { has_live_instance } => {
                if *has_live_instance {
                    log::warn!("Refusing second live instance of {}", type_name);
                    return Err(GovernorError::DuplicateInstance { type_name });
                }
                *has_live_instance = true;
                Ok(ConstructDecision::Allocate)
            }
            PolicyState::SoftReuseInit { weak_handle }
            | PolicyState::SoftSkipInit { weak_handle, .. } => {
                match weak_handle.as_ref().and_then(WeakHandle::resolve) {
                    Some(instance) => Ok(ConstructDecision::Reuse(instance)),
                    None => Ok(ConstructDecision::Allocate),
                }
            }
        }
    }

    /// Records a freshly allocated instance.
    ///
    /// A new allocation only happens once the previously tracked object is
    /// dead, even if its destruction hook has not cleared the state yet, so
    /// the skip-init flag is reset along with the handle.
    pub(crate) fn on_allocated(&mut self, instance: &Instance<T>) {
        match self {
            PolicyState::Hard { .. } => {}
            PolicyState::SoftReuseInit { weak_handle } => {
                *weak_handle = Some(WeakHandle::create(instance));
            }
            PolicyState::SoftSkipInit {
                weak_handle,
                initialized,
            } => {
                *weak_handle = Some(WeakHandle::create(instance));
                *initialized = false;
            }
        }
    }

    /// Rolls back a claim made by [`on_construct`](Self::on_construct).
    pub(crate) fn on_allocation_failed(&mut self) {
        if let PolicyState::Hard { has_live_instance } = self {
            *has_live_instance = false;
        }
    }

    /// Decides whether the original initializer runs.
    ///
    /// Under `SoftSkipInit` the first caller claims the initialization; a
    /// failed initializer hands the claim back through
    /// [`on_initialization_failed`](Self::on_initialization_failed).
    pub(crate) fn on_initialize(&mut self) -> bool {
        match self {
            PolicyState::Hard { .. } | PolicyState::SoftReuseInit { .. } => true,
            PolicyState::SoftSkipInit { initialized, .. } => {
                if *initialized {
                    false
                } else {
                    *initialized = true;
                    true
                }
            }
        }
    }

    pub(crate) fn on_initialization_failed(&mut self) {
        if let PolicyState::SoftSkipInit { initialized, .. } = self {
            *initialized = false;
        }
    }

    /// Clears liveness state for a destroyed instance.
    ///
    /// The soft policies only forget the tracked handle if it observes the
    /// dying object; a handle that has already moved on to a newer instance
    /// is left alone. Calling this on empty state leaves it empty.
    pub(crate) fn on_destroy(&mut self, dying: &Slot<T>) {
        match self {
            PolicyState::Hard { has_live_instance } => *has_live_instance = false,
            PolicyState::SoftReuseInit { weak_handle } => {
                if weak_handle.as_ref().is_some_and(|h| h.refers_to(dying)) {
                    *weak_handle = None;
                }
            }
            PolicyState::SoftSkipInit {
                weak_handle,
                initialized,
            } => {
                if weak_handle.as_ref().is_some_and(|h| h.refers_to(dying)) {
                    *weak_handle = None;
                    *initialized = false;
                }
            }
        }
    }
}

impl<T> fmt::Debug for PolicyState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyState::Hard { has_live_instance } => f
                .debug_struct("Hard")
                .field("has_live_instance", has_live_instance)
                .finish(),
            PolicyState::SoftReuseInit { weak_handle } => f
                .debug_struct("SoftReuseInit")
                .field("weak_handle", weak_handle)
                .finish(),
            PolicyState::SoftSkipInit {
                weak_handle,
                initialized,
            } => f
                .debug_struct("SoftSkipInit")
                .field("weak_handle", weak_handle)
                .field("initialized", initialized)
                .finish(),
        }
    }
}
