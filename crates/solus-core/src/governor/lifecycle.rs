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

//! The two-phase construction capability and the captured lifecycle strategy.
//!
//! A governed type exposes three operations: `allocate` produces a fresh
//! value, `initialize` runs setup logic on an existing value and `teardown`
//! runs user cleanup when the value is destroyed. The governor captures these
//! operations once, at attachment time, in a [`Lifecycle`] and only ever calls
//! the captured copies.

use std::fmt;
use std::sync::Arc;

/// A type that can be built through the two-phase construction protocol.
///
/// `initialize` takes `&self` because under the soft policies the same
/// instance is handed out to every caller; state written by the initializer
/// therefore lives behind interior mutability.
///
/// # Example
///
/// ```rust
/// use solus_core::governor::Constructible;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct Counter {
///     value: AtomicU32,
/// }
///
/// impl Constructible for Counter {
///     type Args = u32;
///
///     fn allocate(_args: &u32) -> anyhow::Result<Self> {
///         Ok(Self { value: AtomicU32::new(0) })
///     }
///
///     fn initialize(&self, start: &u32) -> anyhow::Result<()> {
///         self.value.store(*start, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Constructible: Sized + Send + Sync + 'static {
    /// Arguments accepted by both construction phases.
    type Args: 'static;

    /// Produces a new, not yet initialized value.
    fn allocate(args: &Self::Args) -> anyhow::Result<Self>;

    /// Runs initialization logic on a value. The default does nothing.
    fn initialize(&self, args: &Self::Args) -> anyhow::Result<()> {
        let _ = args;
        Ok(())
    }

    /// Runs user cleanup when the value is destroyed. The default does nothing.
    fn teardown(&self) {}
}

type AllocateFn<T, A> = Box<dyn Fn(&A) -> anyhow::Result<T> + Send + Sync>;
type InitializeFn<T, A> = Box<dyn Fn(&T, &A) -> anyhow::Result<()> + Send + Sync>;
pub(crate) type TeardownFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// The captured allocate/initialize/teardown operations of a governed type.
///
/// Build one from a [`Constructible`] implementation with [`Lifecycle::of`],
/// or adapt an existing type that knows nothing about the governor with
/// [`Lifecycle::adapt`].
pub struct Lifecycle<T, A> {
    allocate: AllocateFn<T, A>,
    initialize: InitializeFn<T, A>,
    teardown: Option<TeardownFn<T>>,
}

impl<T: Constructible> Lifecycle<T, T::Args> {
    /// Captures the operations of a [`Constructible`] type.
    #[must_use]
    pub fn of() -> Self {
        Self {
            allocate: Box::new(|args: &T::Args| T::allocate(args)),
            initialize: Box::new(|instance: &T, args: &T::Args| instance.initialize(args)),
            teardown: Some(Arc::new(|instance: &T| instance.teardown())),
        }
    }
}

impl<T, A> Lifecycle<T, A>
where
    T: Send + Sync + 'static,
    A: 'static,
{
    /// Adapts an existing type from its allocation function alone.
    ///
    /// The resulting lifecycle has a no-op initializer and no teardown until
    /// [`with_initializer`](Self::with_initializer) and
    /// [`with_teardown`](Self::with_teardown) say otherwise.
    pub fn adapt<F>(allocate: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            allocate: Box::new(allocate),
            initialize: Box::new(|_: &T, _: &A| Ok(())),
            teardown: None,
        }
    }

    /// Replaces the initializer.
    #[must_use]
    pub fn with_initializer<F>(mut self, initialize: F) -> Self
    where
        F: Fn(&T, &A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.initialize = Box::new(initialize);
        self
    }

    /// Replaces the teardown.
    #[must_use]
    pub fn with_teardown<F>(mut self, teardown: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(teardown));
        self
    }

    /// Returns `true` if a teardown operation was captured.
    #[must_use]
    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    pub(crate) fn allocate(&self, args: &A) -> anyhow::Result<T> {
        (self.allocate)(args)
    }

    pub(crate) fn initialize(&self, instance: &T, args: &A) -> anyhow::Result<()> {
        (self.initialize)(instance, args)
    }

    pub(crate) fn teardown(&self) -> Option<TeardownFn<T>> {
        self.teardown.clone()
    }
}

impl<T, A> fmt::Debug for Lifecycle<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("has_teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}
