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

//! The instance-lifecycle governor.
//!
//! Attaching a [`SingletonPolicy`] to a type through a [`PolicyRegistry`]
//! yields a [`Governed`] handle. Construction requests made through that
//! handle are intercepted: the [`ConstructionInterceptor`] consults the
//! type's [`PolicyState`] to allocate or reuse, then to initialize or skip,
//! and a [`DestructionHook`] re-arms the state when the object is dropped.
//!
//! The governor never owns the objects it governs. It observes them through a
//! [`WeakHandle`] only, so the caller's ownership decides when an object dies.
//!
//! Gating is by exact runtime type: a request made on behalf of another type
//! (see [`Governed::construct_as`]) runs the original operations untouched.

pub mod error;
pub mod governed;
pub mod hook;
pub mod instance;
pub mod interceptor;
pub mod lifecycle;
pub mod policy;
pub mod registry;
pub mod type_key;
pub mod weak;

pub use error::{GovernorError, GovernorResult};
pub use governed::Governed;
pub use hook::DestructionHook;
pub use instance::Instance;
pub use interceptor::ConstructionInterceptor;
pub use lifecycle::{Constructible, Lifecycle};
pub use policy::{PolicyState, SingletonPolicy};
pub use registry::PolicyRegistry;
pub use type_key::TypeKey;
pub use weak::WeakHandle;
