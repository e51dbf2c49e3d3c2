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

//! Redirects the two construction phases through the governed type's policy.

use super::error::{GovernorError, GovernorResult};
use super::hook::DestructionHook;
use super::instance::Instance;
use super::lifecycle::Lifecycle;
use super::policy::ConstructDecision;
use super::registry::GovernedState;
use super::type_key::TypeKey;
use std::fmt;
use std::sync::Arc;

/// Gates allocation and initialization on the exact runtime type.
///
/// Requests for any type other than the governed one run the captured
/// operations unchanged; requests for the governed type are routed through
/// the policy state.
pub struct ConstructionInterceptor<T, A> {
    state: Arc<GovernedState<T>>,
    lifecycle: Arc<Lifecycle<T, A>>,
}

impl<T, A> ConstructionInterceptor<T, A>
where
    T: Send + Sync + 'static,
    A: 'static,
{
    pub(crate) fn new(state: Arc<GovernedState<T>>, lifecycle: Lifecycle<T, A>) -> Self {
        Self {
            state,
            lifecycle: Arc::new(lifecycle),
        }
    }

    /// The type this interceptor governs.
    #[must_use]
    pub fn governed_type(&self) -> TypeKey {
        self.state.governed
    }

    /// Allocation phase: allocate a new object for `requested`, or reuse one.
    ///
    /// For the governed type this holds the construction gate, so a decision
    /// to allocate and the tracking of the result cannot interleave with
    /// another request.
    pub fn allocate(&self, requested: TypeKey, args: &A) -> GovernorResult<Instance<T>> {
        if requested != self.state.governed {
            log::trace!(
                "{} requested through {}; using original allocate",
                requested,
                self.state.governed
            );
            return self.allocate_unchecked(requested, args);
        }

        let _gate = self.state.gate.lock();
        let decision = self.state.state.lock().on_construct(requested.name())?;
        match decision {
            ConstructDecision::Reuse(instance) => {
                log::debug!("Reusing live instance of {}", requested);
                Ok(instance)
            }
            ConstructDecision::Allocate => match self.allocate_unchecked(requested, args) {
                Ok(instance) => {
                    self.state.state.lock().on_allocated(&instance);
                    log::debug!("Allocated new instance of {}", requested);
                    Ok(instance)
                }
                Err(err) => {
                    self.state.state.lock().on_allocation_failed();
                    Err(err)
                }
            },
        }
    }

    /// Initialization phase for an object returned by [`allocate`](Self::allocate).
    pub fn initialize(&self, instance: &Instance<T>, args: &A) -> GovernorResult<()> {
        let runtime_type = instance.runtime_type();
        if runtime_type != self.state.governed {
            return self.initialize_unchecked(instance, args);
        }

        let _gate = self.state.gate.lock();
        let run = self.state.state.lock().on_initialize();
        if !run {
            log::debug!("Skipping initializer of {}", runtime_type);
            return Ok(());
        }
        self.initialize_unchecked(instance, args).inspect_err(|_| {
            self.state.state.lock().on_initialization_failed();
        })
    }

    fn allocate_unchecked(&self, runtime_type: TypeKey, args: &A) -> GovernorResult<Instance<T>> {
        let value =
            self.lifecycle
                .allocate(args)
                .map_err(|source| GovernorError::Allocation {
                    type_name: runtime_type.name(),
                    source,
                })?;
        let hook = DestructionHook::new(Arc::clone(&self.state), self.lifecycle.teardown());
        Ok(Instance::new(value, runtime_type, hook))
    }

    fn initialize_unchecked(&self, instance: &Instance<T>, args: &A) -> GovernorResult<()> {
        self.lifecycle
            .initialize(instance, args)
            .map_err(|source| GovernorError::Initialization {
                type_name: instance.runtime_type().name(),
                source,
            })
    }
}

impl<T, A> Clone for ConstructionInterceptor<T, A> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<T, A> fmt::Debug for ConstructionInterceptor<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionInterceptor")
            .field("governed", &self.state.governed)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
