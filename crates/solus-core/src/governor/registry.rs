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

//! Per-type policy storage.
//!
//! The [`PolicyRegistry`] is a type-map keyed by [`TypeId`]: every type that
//! opts into governance gets exactly one entry, holding its policy state and
//! its captured lifecycle. Entries of different types never share state, so a
//! type that reuses another's construction path and attaches its own policy is
//! governed independently.

use super::error::{GovernorError, GovernorResult};
use super::governed::Governed;
use super::lifecycle::{Constructible, Lifecycle};
use super::policy::{PolicyState, SingletonPolicy};
use super::type_key::TypeKey;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Policy state shared by a governed type's handle, interceptor and hooks.
///
/// `state` is only ever locked for the duration of a policy decision, never
/// while user code runs. `gate` is held across a full allocate/initialize
/// pair so that concurrent construction requests for the same type are
/// serialized; it is re-entrant so an allocator or initializer may request its
/// own type on the same thread.
pub(crate) struct GovernedState<T> {
    pub(crate) governed: TypeKey,
    pub(crate) policy: SingletonPolicy,
    pub(crate) state: Mutex<PolicyState<T>>,
    pub(crate) gate: ReentrantMutex<()>,
}

impl<T> GovernedState<T> {
    pub(crate) fn new(governed: TypeKey, policy: SingletonPolicy) -> Self {
        Self {
            governed,
            policy,
            state: Mutex::new(PolicyState::empty(policy)),
            gate: ReentrantMutex::new(()),
        }
    }
}

struct RegistryEntry {
    type_key: TypeKey,
    policy: SingletonPolicy,
    handle: Box<dyn Any + Send + Sync>,
}

/// A registry of governed types keyed by [`TypeId`].
///
/// # Example
///
/// ```rust
/// use solus_core::governor::{Constructible, GovernorError, PolicyRegistry, SingletonPolicy};
///
/// struct Settings;
///
/// impl Constructible for Settings {
///     type Args = ();
///
///     fn allocate(_: &()) -> anyhow::Result<Self> {
///         Ok(Settings)
///     }
/// }
///
/// let registry = PolicyRegistry::new();
/// let settings = registry.attach::<Settings>(SingletonPolicy::Hard).unwrap();
///
/// let first = settings.construct(&()).unwrap();
/// assert!(matches!(
///     settings.construct(&()),
///     Err(GovernorError::DuplicateInstance { .. })
/// ));
///
/// drop(first);
/// assert!(settings.construct(&()).is_ok());
/// ```
#[derive(Default)]
pub struct PolicyRegistry {
    entries: RwLock<HashMap<TypeId, RegistryEntry>>,
}

static GLOBAL: OnceLock<PolicyRegistry> = OnceLock::new();

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static PolicyRegistry {
        GLOBAL.get_or_init(PolicyRegistry::new)
    }

    /// Attaches `policy` to a [`Constructible`] type.
    pub fn attach<T: Constructible>(
        &self,
        policy: SingletonPolicy,
    ) -> GovernorResult<Governed<T, T::Args>> {
        self.attach_with(policy, Lifecycle::of())
    }

    /// Attaches `policy` to `T`, capturing `lifecycle` as its original
    /// operations.
    ///
    /// Attachment happens at most once per type: a second call fails with
    /// [`GovernorError::AttachmentConflict`] and leaves the first attachment
    /// and its state untouched.
    pub fn attach_with<T, A>(
        &self,
        policy: SingletonPolicy,
        lifecycle: Lifecycle<T, A>,
    ) -> GovernorResult<Governed<T, A>>
    where
        T: Send + Sync + 'static,
        A: 'static,
    {
        let type_key = TypeKey::of::<T>();
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&type_key.id()) {
            log::warn!(
                "Rejected {} policy for {}: already governed by {}",
                policy,
                type_key,
                existing.policy
            );
            return Err(GovernorError::AttachmentConflict {
                type_name: type_key.name(),
                existing: existing.policy,
            });
        }

        let governed = Governed::new(type_key, policy, lifecycle);
        entries.insert(
            type_key.id(),
            RegistryEntry {
                type_key,
                policy,
                handle: Box::new(governed.clone()),
            },
        );
        log::info!("Attached {} policy to {}", policy, type_key);
        Ok(governed)
    }

    /// Returns the handle of a governed type.
    ///
    /// Returns `None` if `T` is not governed or was attached with a different
    /// argument type than `A`.
    #[must_use]
    pub fn governed<T, A>(&self) -> Option<Governed<T, A>>
    where
        T: Send + Sync + 'static,
        A: 'static,
    {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.handle.downcast_ref::<Governed<T, A>>())
            .cloned()
    }

    /// Returns `true` if a policy is attached to `T`.
    #[must_use]
    pub fn is_governed<T: ?Sized + 'static>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    /// Returns the policy attached to `T`, if any.
    #[must_use]
    pub fn policy_of<T: ?Sized + 'static>(&self) -> Option<SingletonPolicy> {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .map(|entry| entry.policy)
    }

    /// Lists every governed type with its policy.
    #[must_use]
    pub fn governed_types(&self) -> Vec<(TypeKey, SingletonPolicy)> {
        self.entries
            .read()
            .values()
            .map(|entry| (entry.type_key, entry.policy))
            .collect()
    }

    /// Returns the number of governed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no type is governed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeDevice;

    impl Constructible for FakeDevice {
        type Args = ();

        fn allocate(_: &()) -> anyhow::Result<Self> {
            Ok(FakeDevice)
        }
    }

    struct FakeRenderer;

    impl Constructible for FakeRenderer {
        type Args = u32;

        fn allocate(_: &u32) -> anyhow::Result<Self> {
            Ok(FakeRenderer)
        }
    }

    #[test]
    fn test_attach_and_lookup() {
        let registry = PolicyRegistry::new();
        registry
            .attach::<FakeDevice>(SingletonPolicy::SoftSkipInit)
            .unwrap();

        assert!(registry.is_governed::<FakeDevice>());
        assert_eq!(
            registry.policy_of::<FakeDevice>(),
            Some(SingletonPolicy::SoftSkipInit)
        );
        assert!(registry.governed::<FakeDevice, ()>().is_some());
    }

    #[test]
    fn test_lookup_missing_returns_none() {
        let registry = PolicyRegistry::new();
        assert!(registry.governed::<FakeDevice, ()>().is_none());
        assert!(registry.policy_of::<FakeDevice>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_with_wrong_argument_type_returns_none() {
        let registry = PolicyRegistry::new();
        registry.attach::<FakeRenderer>(SingletonPolicy::Hard).unwrap();
        assert!(registry.governed::<FakeRenderer, ()>().is_none());
        assert!(registry.governed::<FakeRenderer, u32>().is_some());
    }

    #[test]
    fn test_second_attachment_is_rejected() {
        let registry = PolicyRegistry::new();
        registry.attach::<FakeDevice>(SingletonPolicy::Hard).unwrap();

        let err = registry
            .attach::<FakeDevice>(SingletonPolicy::SoftReuseInit)
            .unwrap_err();
        assert!(matches!(
            err,
            GovernorError::AttachmentConflict {
                existing: SingletonPolicy::Hard,
                ..
            }
        ));
        assert_eq!(registry.policy_of::<FakeDevice>(), Some(SingletonPolicy::Hard));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_shares_state_with_attached_handle() {
        let registry = PolicyRegistry::new();
        let attached = registry.attach::<FakeDevice>(SingletonPolicy::Hard).unwrap();
        let _live = attached.construct(&()).unwrap();

        let looked_up = registry.governed::<FakeDevice, ()>().unwrap();
        assert!(looked_up.has_live_instance());
        assert!(looked_up.construct(&()).is_err());
    }

    #[test]
    fn test_multiple_types_are_independent() {
        let registry = PolicyRegistry::new();
        let device = registry.attach::<FakeDevice>(SingletonPolicy::Hard).unwrap();
        let renderer = registry.attach::<FakeRenderer>(SingletonPolicy::Hard).unwrap();

        let _device = device.construct(&()).unwrap();
        assert!(renderer.construct(&1).is_ok());

        let mut types = registry.governed_types();
        types.sort_by_key(|(key, _)| key.name());
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_global_registry_is_shared() {
        struct GlobalOnly;
        impl Constructible for GlobalOnly {
            type Args = ();
            fn allocate(_: &()) -> anyhow::Result<Self> {
                Ok(GlobalOnly)
            }
        }

        PolicyRegistry::global()
            .attach::<GlobalOnly>(SingletonPolicy::SoftReuseInit)
            .unwrap();
        assert!(PolicyRegistry::global().is_governed::<GlobalOnly>());
        assert!(std::ptr::eq(PolicyRegistry::global(), PolicyRegistry::global()));
    }
}
