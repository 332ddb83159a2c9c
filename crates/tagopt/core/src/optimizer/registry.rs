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

//! Append-only registry of known modules
//!
//! Modules are addressed by [`ModuleId`], the stable insertion index, so the
//! registry can keep growing while ids handed out earlier stay valid. A
//! module's tree is checked out of its slot while a scheduler works on it.

use crate::error::{OptimizeError, OptimizeResult};
use indexmap::IndexMap;
use std::fmt;

/// Stable identity of a registered module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Position of the module in registration order
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry of every module known to one compilation run
#[derive(Debug)]
pub struct ModuleRegistry<T> {
    modules: IndexMap<String, Option<T>>,
}

impl<T> Default for ModuleRegistry<T> {
    fn default() -> Self {
        Self { modules: IndexMap::new() }
    }
}

impl<T> ModuleRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding only the entry module
    pub fn with_entry(name: impl Into<String>, tree: T) -> (Self, ModuleId) {
        let mut modules = IndexMap::new();
        let (index, _) = modules.insert_full(name.into(), Some(tree));
        (Self { modules }, ModuleId(index))
    }

    /// Register a module under a unique name.
    ///
    /// Returns `None` and drops `tree` if the name is already known.
    pub fn register(&mut self, name: impl Into<String>, tree: T) -> Option<ModuleId> {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return None;
        }
        let (index, _) = self.modules.insert_full(name, Some(tree));
        Some(ModuleId(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<ModuleId> {
        self.modules.get_index_of(name).map(ModuleId)
    }

    /// Name of a registered module
    pub fn name(&self, id: ModuleId) -> OptimizeResult<&str> {
        self.modules
            .get_index(id.0)
            .map(|(name, _)| name.as_str())
            .ok_or(OptimizeError::UnknownModule(id))
    }

    /// Tree of a module, `None` if unknown or currently checked out
    pub fn get(&self, id: ModuleId) -> Option<&T> {
        self.modules.get_index(id.0).and_then(|(_, tree)| tree.as_ref())
    }

    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut T> {
        self.modules.get_index_mut(id.0).and_then(|(_, tree)| tree.as_mut())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Ids of all modules known right now, in registration order
    pub fn ids(&self) -> Vec<ModuleId> {
        (0..self.modules.len()).map(ModuleId).collect()
    }

    /// Take a module's tree out of its slot for exclusive processing
    pub(crate) fn check_out(&mut self, id: ModuleId) -> OptimizeResult<T> {
        let (name, slot) = self.modules.get_index_mut(id.0).ok_or(OptimizeError::UnknownModule(id))?;
        slot.take().ok_or_else(|| OptimizeError::ModuleInUse(name.clone()))
    }

    /// Put a checked out tree back
    pub(crate) fn check_in(&mut self, id: ModuleId, tree: T) -> OptimizeResult<()> {
        let (_, slot) = self.modules.get_index_mut(id.0).ok_or(OptimizeError::UnknownModule(id))?;
        *slot = Some(tree);
        Ok(())
    }

    /// Consume the registry, yielding `(name, tree)` in registration order
    pub fn into_trees(self) -> Vec<(String, T)> {
        self.modules
            .into_iter()
            .filter_map(|(name, tree)| tree.map(|tree| (name, tree)))
            .collect()
    }
}
