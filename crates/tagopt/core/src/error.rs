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

//! Error handling for the optimization engine
//!
//! Every variant is fatal for the compilation that raised it. The scheduler
//! and the driver never retry and never recover partial results.

use crate::optimizer::registry::ModuleId;
use thiserror::Error;

/// Result type used throughout the optimizer
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur while optimizing a program
#[derive(Error, Debug)]
pub enum OptimizeError {
    // Pass Errors
    #[error("Pass '{pass}' failed on module '{module}': {message}")]
    PassFailed { pass: String, module: String, message: String },

    // Scheduling Errors
    #[error("Invalid eligibility rule: {0}")]
    InvalidRule(String),

    #[error("Module '{module}' exceeded the limit of {limit} refresh cycles without reaching a fixpoint")]
    RefreshLimitExceeded { module: String, limit: usize },

    // Registry Errors
    #[error("Unknown module id: {0}")]
    UnknownModule(ModuleId),

    #[error("Module '{0}' is already being optimized")]
    ModuleInUse(String),

    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl OptimizeError {
    /// Create a pass failure for the given pass and module
    pub fn pass_failed(pass: impl Into<String>, module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PassFailed {
            pass: pass.into(),
            module: module.into(),
            message: message.into(),
        }
    }

    /// Whether the error was raised by a pass rather than by the engine itself
    pub fn is_pass_failure(&self) -> bool {
        matches!(self, Self::PassFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_failed_display() {
        let err = OptimizeError::pass_failed("fold", "main", "bad constant");
        assert_eq!(err.to_string(), "Pass 'fold' failed on module 'main': bad constant");
        assert!(err.is_pass_failure());
    }

    #[test]
    fn test_refresh_limit_display() {
        let err = OptimizeError::RefreshLimitExceeded {
            module: "os.path".to_string(),
            limit: 3,
        };
        assert_eq!(err.to_string(), "Module 'os.path' exceeded the limit of 3 refresh cycles without reaching a fixpoint");
        assert!(!err.is_pass_failure());
    }
}
