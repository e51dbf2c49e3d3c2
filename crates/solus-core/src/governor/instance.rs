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

//! Shared handles to constructed objects.

use super::hook::DestructionHook;
use super::type_key::TypeKey;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Storage for one constructed object.
///
/// The slot remembers the runtime type the object was constructed for, so the
/// destruction hook can apply the same exact-type gate as construction.
pub(crate) struct Slot<T> {
    value: T,
    runtime_type: TypeKey,
    hook: DestructionHook<T>,
}

impl<T> Slot<T> {
    pub(crate) fn runtime_type(&self) -> TypeKey {
        self.runtime_type
    }

    pub(crate) fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        self.hook.fire(self);
    }
}

/// A shared, reference-counted handle to a constructed object.
///
/// Ownership stays with the callers holding `Instance` handles; the governor
/// only observes the object through a [`WeakHandle`](super::WeakHandle). The
/// object is destroyed, and its type's destruction hook fired, when the last
/// `Instance` is dropped.
pub struct Instance<T>(pub(crate) Arc<Slot<T>>);

impl<T> Instance<T> {
    pub(crate) fn new(value: T, runtime_type: TypeKey, hook: DestructionHook<T>) -> Self {
        Self(Arc::new(Slot {
            value,
            runtime_type,
            hook,
        }))
    }

    /// The type this object was constructed for.
    ///
    /// This differs from `T` when the construction was requested on behalf of
    /// a type reusing `T`'s construction path.
    #[must_use]
    pub fn runtime_type(&self) -> TypeKey {
        self.0.runtime_type
    }

    /// Returns `true` if both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Number of live `Instance` handles to this object.
    #[must_use]
    pub fn handle_count(this: &Self) -> usize {
        Arc::strong_count(&this.0)
    }
}

impl<T> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Instance<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Instance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("runtime_type", &self.0.runtime_type.name())
            .field("value", &self.0.value)
            .finish()
    }
}
