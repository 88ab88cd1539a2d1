//! Session configuration.

use serde::{Deserialize, Serialize};

use vaultedit_common::{Error, Result};

use crate::filter::SortMode;

/// Initial view settings for an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sort mode of the group list.
    pub group_sort: SortMode,
    /// Sort mode of the entry list.
    pub entry_sort: SortMode,
    /// Start with every root group expanded.
    pub expand_root_groups: bool,
}

impl SessionConfig {
    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON.
    ///
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
