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

//! Defines the error types shared by the core subsystems.
//!
//! Contract violations (popping an empty sequence, firing before the bus is
//! initialized, ...) are not errors in this sense: they are logged and reported
//! through a `false`/`None` return. The types below cover the conditions a caller
//! can meaningfully recover from.

use crate::event::EventCode;
use crate::memory::MemoryTag;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised by the tagged allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The platform allocator refused the request.
    #[error("Out of memory: failed to allocate {size} bytes tagged {tag}")]
    OutOfMemory {
        /// The number of bytes that were requested.
        size: u64,
        /// The tag the allocation would have been accounted under.
        tag: MemoryTag,
    },
}

/// An error raised by [`Sequence`](crate::containers::Sequence) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The index does not address an existing element.
    #[error("Index out of bounds: length={length}, index={index}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The length of the sequence at the time of the call.
        length: usize,
    },
    /// Growing the backing storage failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// An error that can occur while loading an [`ApplicationConfig`](crate::config::ApplicationConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Io {
        /// The path that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration source is not valid JSON for the expected schema.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An error raised by the [`Application`](crate::application::Application) lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// The event bus refused to initialize.
    #[error("Failed to initialize the event system")]
    EventSystemUnavailable,
    /// One of the application's own listeners could not be registered.
    #[error("Failed to register the application listener for event code {code:#04x}")]
    RegistrationFailed {
        /// The code the registration was attempted for.
        code: EventCode,
    },
}
