// Copyright 2025 Fernando Borretti
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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::NewCard;

pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_SESSION_LIMIT: usize = 20;

/// Per-collection settings, read from `config.toml` in the collection
/// directory. Every field is optional.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub deck: DeckConfig,
    pub session: SessionConfig,
}

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DeckConfig {
    /// If non-empty, the first tag of every new card must be one of these.
    pub stages: Vec<String>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    /// The maximum number of due cards to show. Zero means no limit.
    pub limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SESSION_LIMIT,
        }
    }
}

impl Config {
    /// Load the config file from the given directory, falling back to the
    /// defaults if there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No config file, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Check a new card against the configured stages.
    pub fn check_card(&self, card: &NewCard) -> Fallible<()> {
        let stages = &self.deck.stages;
        if stages.is_empty() {
            return Ok(());
        }
        match card.stage() {
            Some(stage) if stages.iter().any(|s| s == stage) => Ok(()),
            Some(stage) => Err(ErrorReport::validation(format!(
                "unknown stage '{stage}', expected one of: {}",
                stages.join(", ")
            ))),
            None => Err(ErrorReport::validation(format!(
                "card has no stage tag, expected one of: {}",
                stages.join(", ")
            ))),
        }
    }

    /// Truncate a due list to the session limit.
    pub fn session_limit(&self) -> Option<usize> {
        match self.session.limit {
            0 => None,
            limit => Some(limit),
        }
    }
}
