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

//! Optimization pass interface

use crate::error::OptimizeResult;
use crate::optimizer::framework::tags::TagSet;
use crate::optimizer::registry::{ModuleId, ModuleRegistry};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A single optimization pass.
///
/// Implementors are meant to be a closed enum of pass kinds; each value is the
/// identity the work queue and the eligibility table refer to. A pass signals
/// what it changed only through [`PassContext::emit`] and must exhaust the
/// conditions that made it eligible, otherwise the fixpoint loop never settles.
pub trait Pass: Copy + Eq + Hash + Debug {
    /// Tree type the pass rewrites
    type Tree;

    /// Unique name of the pass
    fn name(&self) -> &'static str;

    /// Short description of the pass
    fn description(&self) -> &'static str {
        ""
    }

    /// Rewrite `tree` in place. Any error aborts the whole compilation.
    fn execute(&self, tree: &mut Self::Tree, cx: &mut PassContext<'_, Self::Tree>) -> OptimizeResult<()>;
}

/// Everything a pass may touch besides its tree
pub struct PassContext<'a, T> {
    module: ModuleId,
    module_name: &'a str,
    tags: &'a mut TagSet,
    registry: &'a mut ModuleRegistry<T>,
    emitted: usize,
}

impl<'a, T> PassContext<'a, T> {
    pub(crate) fn new(module: ModuleId, module_name: &'a str, tags: &'a mut TagSet, registry: &'a mut ModuleRegistry<T>) -> Self {
        Self {
            module,
            module_name,
            tags,
            registry,
            emitted: 0,
        }
    }

    /// Signal a category of change made to the tree
    pub fn emit(&mut self, tag: &str) {
        self.tags.on_signal(tag);
        self.emitted += 1;
    }

    /// Id of the module being optimized
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Name of the module being optimized
    pub fn module_name(&self) -> &str {
        self.module_name
    }

    /// Whether a module with this name is already known to the program
    pub fn is_known(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Make a newly discovered module known to the whole-program driver.
    ///
    /// Returns `None` if the module was already registered.
    pub fn register_module(&mut self, name: impl Into<String>, tree: T) -> Option<ModuleId> {
        let name = name.into();
        let id = self.registry.register(name.as_str(), tree);
        if let Some(id) = id {
            debug!(module = %self.module_name, discovered = %name, id = %id, "Discovered module");
        }
        id
    }

    /// Number of emissions during this pass execution
    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }
}
