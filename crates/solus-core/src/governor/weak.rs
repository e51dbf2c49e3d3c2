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

//! Non-owning liveness observation of a governed object.

use super::instance::{Instance, Slot};
use std::fmt;
use std::sync::{Arc, Weak};

/// A non-owning reference to an [`Instance`].
///
/// Holding a `WeakHandle` never keeps the object alive: once every `Instance`
/// handle is dropped, [`resolve`](Self::resolve) returns `None`.
pub struct WeakHandle<T> {
    inner: Weak<Slot<T>>,
}

impl<T> WeakHandle<T> {
    /// Captures a non-owning observation of `instance`.
    #[must_use]
    pub fn create(instance: &Instance<T>) -> Self {
        Self {
            inner: Arc::downgrade(&instance.0),
        }
    }

    /// Returns a strong handle if the object is still alive.
    #[must_use]
    pub fn resolve(&self) -> Option<Instance<T>> {
        self.inner.upgrade().map(Instance)
    }

    /// Returns `true` if the object has not been destroyed yet.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Returns `true` if this handle observes `slot`, alive or not.
    pub(crate) fn refers_to(&self, slot: &Slot<T>) -> bool {
        std::ptr::eq(self.inner.as_ptr(), slot)
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
