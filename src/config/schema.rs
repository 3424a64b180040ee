use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dataset file (JSON or YAML); relative paths resolve against the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

impl Config {
    /// The config `lapboard init` writes: every scoring default spelled out
    pub fn starter() -> Self {
        Self {
            data: None,
            scoring: Some(ScoringConfig::default()),
        }
    }

    /// Scoring rules in effect, falling back to defaults when the section is absent
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
