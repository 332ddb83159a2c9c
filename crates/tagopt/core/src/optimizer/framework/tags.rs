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

//! Change signals emitted by passes
//!
//! A [`TagSet`] collects the tags emitted since the last refresh. Queries are
//! conjunctive: `check("new_code new_constant")` holds only if both tags are
//! present.

use std::collections::BTreeSet;
use std::fmt;

/// The whole tree should be treated as freshly produced
pub const NEW_CODE: &str = "new_code";
/// A new variable was introduced
pub const NEW_VARIABLE: &str = "new_variable";
/// A new import was introduced
pub const NEW_IMPORT: &str = "new_import";
/// A new constant value was discovered
pub const NEW_CONSTANT: &str = "new_constant";
/// Statement sequences were restructured
pub const NEW_STATEMENTS: &str = "new_statements";
/// A builtin reference was introduced or resolved
pub const NEW_BUILTIN: &str = "new_builtin";
/// A raise was introduced or simplified
pub const NEW_RAISE: &str = "new_raise";
/// A module variable was found to be read only
pub const READ_ONLY_MVAR: &str = "read_only_mvar";
/// Variable usage information changed
pub const VAR_USAGE: &str = "var_usage";

/// Mutable set of tags for one module's fixpoint loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag; inserting a present tag is a no-op
    pub fn add(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Emission hook handed to passes
    pub fn on_signal(&mut self, tag: &str) {
        self.add(tag);
    }

    /// Remove every tag
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Whether a single tag is present
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether every whitespace separated tag in `predicate` is present.
    /// An empty predicate holds vacuously.
    pub fn check(&self, predicate: &str) -> bool {
        self.check_all(predicate.split_whitespace())
    }

    /// Whether every tag yielded by `required` is present
    pub fn check_all<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required.into_iter().all(|tag| self.tags.contains(tag.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{tag}")?;
        }
        write!(f, "}}")
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tags.extend(iter.into_iter().map(Into::into));
    }
}
