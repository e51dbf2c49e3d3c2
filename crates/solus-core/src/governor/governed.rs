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

//! The handle returned by attachment.

use super::error::GovernorResult;
use super::instance::Instance;
use super::interceptor::ConstructionInterceptor;
use super::lifecycle::Lifecycle;
use super::policy::SingletonPolicy;
use super::registry::GovernedState;
use super::type_key::TypeKey;
use std::fmt;
use std::sync::Arc;

/// The construction entry point of a governed type.
///
/// Obtained from [`PolicyRegistry::attach`](super::PolicyRegistry::attach)
/// and used in place of direct construction. Cloning is cheap; all clones
/// share the same policy state.
pub struct Governed<T, A> {
    state: Arc<GovernedState<T>>,
    interceptor: ConstructionInterceptor<T, A>,
}

impl<T, A> Governed<T, A>
where
    T: Send + Sync + 'static,
    A: 'static,
{
    pub(crate) fn new(governed: TypeKey, policy: SingletonPolicy, lifecycle: Lifecycle<T, A>) -> Self {
        let state = Arc::new(GovernedState::new(governed, policy));
        let interceptor = ConstructionInterceptor::new(Arc::clone(&state), lifecycle);
        Self { state, interceptor }
    }

    /// Constructs `T` under its policy: allocate (or reuse), then initialize
    /// (or skip).
    pub fn construct(&self, args: &A) -> GovernorResult<Instance<T>> {
        self.construct_for(TypeKey::of::<T>(), args)
    }

    /// Constructs an object on behalf of `S`, a type that builds itself on
    /// top of `T`'s construction path.
    ///
    /// Unless `S` is `T` itself, the policy is bypassed: the original allocate
    /// and initialize run unchanged and the resulting object is not tracked.
    /// `S` can opt into governance independently by attaching its own policy.
    pub fn construct_as<S: ?Sized + 'static>(&self, args: &A) -> GovernorResult<Instance<T>> {
        self.construct_for(TypeKey::of::<S>(), args)
    }

    /// Constructs an object for the runtime type `requested`.
    pub fn construct_for(&self, requested: TypeKey, args: &A) -> GovernorResult<Instance<T>> {
        let _gate = self.state.gate.lock();
        let instance = self.interceptor.allocate(requested, args)?;
        self.interceptor.initialize(&instance, args)?;
        Ok(instance)
    }

    /// The policy attached to `T`.
    #[must_use]
    pub fn policy(&self) -> SingletonPolicy {
        self.state.policy
    }

    /// The governed type.
    #[must_use]
    pub fn governed_type(&self) -> TypeKey {
        self.state.governed
    }

    /// Returns `true` if an instance of `T` is currently alive.
    #[must_use]
    pub fn has_live_instance(&self) -> bool {
        self.state.state.lock().has_live_instance()
    }

    /// The live instance under a soft policy.
    ///
    /// Always `None` under [`SingletonPolicy::Hard`], which tracks liveness
    /// with a flag only.
    #[must_use]
    pub fn current(&self) -> Option<Instance<T>> {
        self.state.state.lock().current()
    }

    /// The interceptor, for callers driving the two phases separately.
    #[must_use]
    pub fn interceptor(&self) -> &ConstructionInterceptor<T, A> {
        &self.interceptor
    }
}

impl<T, A> Clone for Governed<T, A> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            interceptor: self.interceptor.clone(),
        }
    }
}

impl<T, A> fmt::Debug for Governed<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Governed")
            .field("governed", &self.state.governed)
            .field("policy", &self.state.policy)
            .field("state", &*self.state.state.lock())
            .finish()
    }
}
