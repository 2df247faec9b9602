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

//! Application start-up configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The settings an [`Application`](crate::Application) starts with.
///
/// Every field is optional in the serialized form; missing fields take their
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// The window title.
    pub name: String,
    /// Initial horizontal window position, handed to [`Platform::startup`](crate::Platform::startup).
    pub start_pos_x: i32,
    /// Initial vertical window position, handed to [`Platform::startup`](crate::Platform::startup).
    pub start_pos_y: i32,
    /// Initial client width in pixels.
    pub width: u32,
    /// Initial client height in pixels.
    pub height: u32,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "Vela Application".to_owned(),
            start_pos_x: 100,
            start_pos_y: 100,
            width: 1280,
            height: 720,
        }
    }
}

impl ApplicationConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the JSON configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded configuration '{}' from {}.", config.name, path.display());
        Ok(config)
    }
}
