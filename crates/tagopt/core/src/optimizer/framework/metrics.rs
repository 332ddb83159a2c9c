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

//! Optimization metrics

use crate::optimizer::registry::ModuleId;

/// Metrics for a single pass invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassMetrics {
    /// Name of the pass
    pub pass_name: &'static str,
    /// Duration of the pass in milliseconds
    pub duration_ms: u128,
    /// Number of tag emissions made by the pass
    pub tags_emitted: usize,
}

/// Metrics recorded while one module reached its fixpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetrics {
    /// Module that was optimized
    pub module: ModuleId,
    /// Name of the module
    pub module_name: String,
    /// Executed passes in execution order
    pub passes: Vec<PassMetrics>,
    /// Number of refreshes, including the initial one
    pub refresh_cycles: usize,
}

impl ModuleMetrics {
    pub fn new(module: ModuleId, module_name: impl Into<String>) -> Self {
        Self {
            module,
            module_name: module_name.into(),
            passes: Vec::new(),
            refresh_cycles: 0,
        }
    }

    /// Total number of passes executed
    pub fn total_passes(&self) -> usize {
        self.passes.len()
    }

    /// Names of executed passes in execution order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|m| m.pass_name).collect()
    }
}
