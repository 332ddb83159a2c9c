// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Configuration for the optimization engine
//!
//! The configuration is fixed for the duration of one compilation run. Rules
//! of the eligibility table only ever read it through [`OptimizationConfig::flag`].

use crate::error::{OptimizeError, OptimizeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV: &str = "TAGOPT_CONFIG";
/// Environment override for [`OptimizationConfig::show_progress`]
pub const SHOW_PROGRESS_ENV: &str = "TAGOPT_SHOW_PROGRESS";
/// Environment override for [`OptimizationConfig::value_propagation`]
pub const VALUE_PROPAGATION_ENV: &str = "TAGOPT_VALUE_PROPAGATION";
/// Environment override for [`OptimizationConfig::module_mode`]
pub const MODULE_MODE_ENV: &str = "TAGOPT_MODULE_MODE";

/// Default bound on refresh cycles per module
pub const DEFAULT_MAX_REFRESH_CYCLES: usize = 10_000;

/// Boolean options that eligibility rules may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFlag {
    /// Value propagation replaces several local folding passes
    ValuePropagation,
    /// Compiling a single extension module rather than a whole program
    ModuleMode,
    /// Optimize `exec` of constant strings
    OptimizeStringExec,
}

/// Configuration for the optimization engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Whether value propagation is enabled
    pub value_propagation: bool,

    /// Whether only a single module is compiled (no import recursion)
    pub module_mode: bool,

    /// Whether constant string `exec` statements are optimized
    pub optimize_string_exec: bool,

    /// Whether human readable progress lines are logged
    pub show_progress: bool,

    /// Diagnostic bound on refresh cycles per module (None for unlimited)
    pub max_refresh_cycles: Option<usize>,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            value_propagation: false,
            module_mode: false,
            optimize_string_exec: true,
            show_progress: false,
            max_refresh_cycles: Some(DEFAULT_MAX_REFRESH_CYCLES),
        }
    }
}

impl OptimizationConfig {
    /// Read the value of a rule-visible flag
    pub fn flag(&self, flag: ConfigFlag) -> bool {
        match flag {
            ConfigFlag::ValuePropagation => self.value_propagation,
            ConfigFlag::ModuleMode => self.module_mode,
            ConfigFlag::OptimizeStringExec => self.optimize_string_exec,
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> OptimizeResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> OptimizeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path wins over `TAGOPT_CONFIG`, which wins over the defaults.
    /// Individual `TAGOPT_*` flag variables are applied on top.
    pub fn resolve(path: Option<PathBuf>) -> OptimizeResult<Self> {
        let mut config = if let Some(path) = path {
            Self::load_from_file(path)?
        } else if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            Self::load_from_file(env_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply flag overrides from a key lookup (the process environment in [`Self::resolve`])
    pub fn apply_overrides<F>(&mut self, lookup: F) -> OptimizeResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(SHOW_PROGRESS_ENV) {
            self.show_progress = parse_bool(SHOW_PROGRESS_ENV, &value)?;
        }
        if let Some(value) = lookup(VALUE_PROPAGATION_ENV) {
            self.value_propagation = parse_bool(VALUE_PROPAGATION_ENV, &value)?;
        }
        if let Some(value) = lookup(MODULE_MODE_ENV) {
            self.module_mode = parse_bool(MODULE_MODE_ENV, &value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> OptimizeResult<()> {
        if self.max_refresh_cycles == Some(0) {
            return Err(OptimizeError::Config("max_refresh_cycles must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> OptimizeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(OptimizeError::Config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = OptimizationConfig::default();
        assert!(!config.flag(ConfigFlag::ValuePropagation));
        assert!(!config.flag(ConfigFlag::ModuleMode));
        assert!(config.flag(ConfigFlag::OptimizeStringExec));
        assert_eq!(config.max_refresh_cycles, Some(DEFAULT_MAX_REFRESH_CYCLES));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = OptimizationConfig::from_toml_str("module_mode = true\nshow_progress = true\n").unwrap();
        assert!(config.module_mode);
        assert!(config.show_progress);
        assert!(config.optimize_string_exec);
        assert_eq!(config.max_refresh_cycles, Some(DEFAULT_MAX_REFRESH_CYCLES));
    }

    #[test]
    fn test_zero_refresh_cap_rejected() {
        let err = OptimizationConfig::from_toml_str("max_refresh_cycles = 0").unwrap_err();
        assert!(matches!(err, OptimizeError::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = OptimizationConfig::from_toml_str("module_mode = \"maybe\"").unwrap_err();
        assert!(matches!(err, OptimizeError::Toml(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [(SHOW_PROGRESS_ENV, "yes"), (VALUE_PROPAGATION_ENV, "1")].into_iter().collect();
        let mut config = OptimizationConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert!(config.show_progress);
        assert!(config.value_propagation);
        assert!(!config.module_mode);
    }

    #[test]
    fn test_bad_override() {
        let mut config = OptimizationConfig::default();
        let err = config
            .apply_overrides(|key| (key == MODULE_MODE_ENV).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(MODULE_MODE_ENV));
    }

    #[test]
    fn test_load_missing_file() {
        let err = OptimizationConfig::load_from_file("/nonexistent/tagopt.toml").unwrap_err();
        assert!(matches!(err, OptimizeError::Io(_)));
    }
}
