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

//! Errors raised by the instance-lifecycle governor.

use super::policy::SingletonPolicy;
use thiserror::Error;

/// Errors returned to callers of construction and attachment.
#[derive(Debug, Error)]
pub enum GovernorError {
    /// The hard policy refused a second live instance.
    #[error("only one instance of {type_name} can exist")]
    DuplicateInstance {
        /// The governed type.
        type_name: &'static str,
    },

    /// A policy is already attached to the type.
    #[error("{type_name} is already governed by the {existing} policy")]
    AttachmentConflict {
        /// The type that was attached twice.
        type_name: &'static str,
        /// The policy attached first, which stays in effect.
        existing: SingletonPolicy,
    },

    /// The captured allocate operation failed.
    #[error("failed to allocate {type_name}")]
    Allocation {
        /// The type whose allocation failed.
        type_name: &'static str,
        /// The error returned by the allocate operation.
        #[source]
        source: anyhow::Error,
    },

    /// The captured initializer failed.
    #[error("failed to initialize {type_name}")]
    Initialization {
        /// The type whose initializer failed.
        type_name: &'static str,
        /// The error returned by the initializer.
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for governor operations.
pub type GovernorResult<T> = Result<T, GovernorError>;
