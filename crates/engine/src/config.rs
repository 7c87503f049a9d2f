//! Verification run configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use docverify_model::Severity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EngineError;

/// Which renderings of the report to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Console,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Console => "console",
            Self::Both => "both",
        }
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn includes_console(&self) -> bool {
        matches!(self, Self::Console | Self::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown output format: {0} (expected json, console or both)")]
pub struct ParseOutputFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "console" => Ok(Self::Console),
            "both" => Ok(Self::Both),
            _ => Err(ParseOutputFormatError(s.to_string())),
        }
    }
}

/// Settings for one verification engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Rule ids to skip entirely
    pub disabled_rules: BTreeSet<String>,

    /// Only run rules at or above this severity
    pub severity_filter: Option<Severity>,

    /// Stop at the first CRITICAL rule that fails
    pub stop_on_critical_fail: bool,

    /// Report renderings to produce
    pub output_format: OutputFormat,

    /// Include rule details in console output
    pub verbose: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            disabled_rules: BTreeSet::new(),
            severity_filter: None,
            stop_on_critical_fail: false,
            output_format: OutputFormat::Both,
            verbose: true,
        }
    }
}

impl VerificationConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| EngineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn disable_rule(&mut self, rule_id: impl Into<String>) {
        self.disabled_rules.insert(rule_id.into());
    }

    pub fn enable_rule(&mut self, rule_id: &str) {
        self.disabled_rules.remove(rule_id);
    }

    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        !self.disabled_rules.contains(rule_id)
    }

    /// Whether a rule of `severity` clears the configured floor.
    pub fn admits(&self, severity: Severity) -> bool {
        self.severity_filter.map_or(true, |floor| severity >= floor)
    }
}
