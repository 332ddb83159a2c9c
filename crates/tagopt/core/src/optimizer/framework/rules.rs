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

//! Eligibility rules mapping tags to passes
//!
//! The table is evaluated top to bottom on every refresh. There is no early
//! exit: every matching rule contributes its passes, in rule order, and the
//! work queue collapses duplicates. The decision itself ([`EligibilityTable::eligible`])
//! is a pure function of the tag set and the configuration.

use crate::config::{ConfigFlag, OptimizationConfig};
use crate::error::{OptimizeError, OptimizeResult};
use crate::optimizer::framework::queue::WorkQueue;
use crate::optimizer::framework::tags::TagSet;
use indexmap::IndexSet;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::trace;

/// Configuration predicate attached to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Holds when the flag is set
    Enabled(ConfigFlag),
    /// Holds when the flag is not set
    Disabled(ConfigFlag),
}

impl Condition {
    pub fn holds(&self, config: &OptimizationConfig) -> bool {
        match *self {
            Condition::Enabled(flag) => config.flag(flag),
            Condition::Disabled(flag) => !config.flag(flag),
        }
    }
}

/// A single eligibility rule
#[derive(Debug, Clone)]
pub struct Rule<P> {
    requires: Vec<String>,
    conditions: Vec<Condition>,
    targets: Vec<P>,
}

impl<P: Copy + Eq + Hash> Rule<P> {
    /// Rule that queues `targets` when every tag in `requires` is present
    pub fn new<I>(requires: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
    {
        Self {
            requires: requires.split_whitespace().map(str::to_string).collect(),
            conditions: Vec::new(),
            targets: targets.into_iter().collect(),
        }
    }

    /// Additionally require a configuration condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn targets(&self) -> &[P] {
        &self.targets
    }

    /// Whether the rule fires for the given tags and configuration
    pub fn matches(&self, tags: &TagSet, config: &OptimizationConfig) -> bool {
        self.conditions.iter().all(|condition| condition.holds(config)) && tags.check_all(&self.requires)
    }

    fn validate(&self, index: usize) -> OptimizeResult<()> {
        if self.targets.is_empty() {
            return Err(OptimizeError::InvalidRule(format!("rule {index} has no target passes")));
        }
        // A rule without required tags would fire on every refresh and never settle
        if self.requires.is_empty() {
            return Err(OptimizeError::InvalidRule(format!("rule {index} requires no tags")));
        }
        Ok(())
    }
}

/// Ordered list of eligibility rules
#[derive(Debug, Clone)]
pub struct EligibilityTable<P> {
    rules: Vec<Rule<P>>,
}

impl<P: Copy + Eq + Hash + Debug> EligibilityTable<P> {
    /// Build a table from rules, validating each one
    pub fn new(rules: Vec<Rule<P>>) -> OptimizeResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(Self { rules })
    }

    pub fn builder() -> EligibilityTableBuilder<P> {
        EligibilityTableBuilder { rules: Vec::new(), error: None }
    }

    pub fn rules(&self) -> &[Rule<P>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Passes made eligible by the current tags, in rule order, without duplicates
    pub fn eligible(&self, tags: &TagSet, config: &OptimizationConfig) -> Vec<P> {
        let mut passes = IndexSet::new();
        for rule in &self.rules {
            if rule.matches(tags, config) {
                passes.extend(rule.targets.iter().copied());
            }
        }
        passes.into_iter().collect()
    }

    /// Queue every eligible pass and clear the tags.
    ///
    /// Returns the number of passes that were not already queued.
    pub fn refresh(&self, tags: &mut TagSet, config: &OptimizationConfig, queue: &mut WorkQueue<P>) -> usize {
        let passes = self.eligible(tags, config);
        trace!(tags = %tags, eligible = ?passes, "Refreshing optimizations from tags");
        let added = queue.extend(passes);
        tags.clear();
        added
    }
}

/// Incremental construction of an [`EligibilityTable`]
#[derive(Debug)]
pub struct EligibilityTableBuilder<P> {
    rules: Vec<Rule<P>>,
    error: Option<OptimizeError>,
}

impl<P: Copy + Eq + Hash + Debug> EligibilityTableBuilder<P> {
    /// Append a rule
    pub fn rule<I>(mut self, requires: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
    {
        self.rules.push(Rule::new(requires, targets));
        self
    }

    /// Restrict the most recent rule to configurations where `flag` is set
    pub fn when(self, flag: ConfigFlag) -> Self {
        self.condition(Condition::Enabled(flag))
    }

    /// Restrict the most recent rule to configurations where `flag` is not set
    pub fn unless(self, flag: ConfigFlag) -> Self {
        self.condition(Condition::Disabled(flag))
    }

    fn condition(mut self, condition: Condition) -> Self {
        match self.rules.pop() {
            Some(rule) => self.rules.push(rule.with_condition(condition)),
            None => {
                self.error
                    .get_or_insert_with(|| OptimizeError::InvalidRule(format!("condition {condition:?} before any rule")));
            }
        }
        self
    }

    pub fn build(self) -> OptimizeResult<EligibilityTable<P>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        EligibilityTable::new(self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::framework::tags::{NEW_CODE, NEW_CONSTANT, NEW_VARIABLE};
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        X,
        Y,
        Z,
    }

    fn sample_table() -> EligibilityTable<Kind> {
        EligibilityTable::builder()
            .rule("new_code new_variable", [Kind::X])
            .rule("new_code", [Kind::Y])
            .build()
            .unwrap()
    }

    #[test]
    fn test_conjunction_must_be_satisfied() {
        let table = sample_table();
        let mut tags: TagSet = [NEW_CODE].into_iter().collect();
        let mut queue = WorkQueue::new();

        assert_eq!(table.refresh(&mut tags, &OptimizationConfig::default(), &mut queue), 1);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![Kind::Y]);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_all_matching_rules_contribute_in_order() {
        let table = sample_table();
        let tags: TagSet = [NEW_CODE, NEW_VARIABLE].into_iter().collect();
        assert_eq!(table.eligible(&tags, &OptimizationConfig::default()), vec![Kind::X, Kind::Y]);
    }

    #[test]
    fn test_empty_tags_queue_nothing() {
        let table = sample_table();
        let mut tags = TagSet::new();
        let mut queue = WorkQueue::new();
        assert_eq!(table.refresh(&mut tags, &OptimizationConfig::default(), &mut queue), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_conditions_gate_rules() {
        let table = EligibilityTable::builder()
            .rule("new_constant", [Kind::X])
            .unless(ConfigFlag::ValuePropagation)
            .rule("new_constant", [Kind::Z])
            .when(ConfigFlag::ValuePropagation)
            .build()
            .unwrap();
        let tags: TagSet = [NEW_CONSTANT].into_iter().collect();

        let plain = OptimizationConfig::default();
        assert_eq!(table.eligible(&tags, &plain), vec![Kind::X]);

        let propagating = OptimizationConfig {
            value_propagation: true,
            ..Default::default()
        };
        assert_eq!(table.eligible(&tags, &propagating), vec![Kind::Z]);
    }

    #[test]
    fn test_pass_groups_and_duplicates() {
        let table = EligibilityTable::builder()
            .rule("new_code", [Kind::Z, Kind::X])
            .rule("new_code", [Kind::X, Kind::Y])
            .build()
            .unwrap();
        let tags: TagSet = [NEW_CODE].into_iter().collect();
        assert_eq!(table.eligible(&tags, &OptimizationConfig::default()), vec![Kind::Z, Kind::X, Kind::Y]);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let no_targets = EligibilityTable::<Kind>::builder().rule("new_code", []).build();
        assert!(matches!(no_targets, Err(OptimizeError::InvalidRule(_))));

        let no_tags = EligibilityTable::builder().rule("  ", [Kind::X]).build();
        assert!(matches!(no_tags, Err(OptimizeError::InvalidRule(_))));
    }

    #[test]
    fn test_condition_without_rule_rejected() {
        let result = EligibilityTable::builder()
            .when(ConfigFlag::ValuePropagation)
            .rule("new_code", [Kind::X])
            .build();

        match result {
            Err(OptimizeError::InvalidRule(message)) => assert!(message.contains("before any rule")),
            other => panic!("expected an invalid rule error, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_refresh_is_deterministic(mask in 0u8..8, propagate in any::<bool>()) {
            let table = EligibilityTable::builder()
                .rule("new_code new_variable", [Kind::X])
                .rule("new_constant", [Kind::Z, Kind::Y])
                .unless(ConfigFlag::ValuePropagation)
                .rule("new_code", [Kind::Y])
                .build()
                .unwrap();
            let names = [NEW_CODE, NEW_VARIABLE, NEW_CONSTANT];
            let tags: TagSet = names.iter().enumerate().filter(|(i, _)| mask & (1u8 << *i) != 0).map(|(_, t)| *t).collect();
            let config = OptimizationConfig { value_propagation: propagate, ..Default::default() };

            let mut first_tags = tags.clone();
            let mut second_tags = tags.clone();
            let mut first = WorkQueue::new();
            let mut second = WorkQueue::new();
            table.refresh(&mut first_tags, &config, &mut first);
            table.refresh(&mut second_tags, &config, &mut second);

            prop_assert_eq!(first.iter().collect::<Vec<_>>(), second.iter().collect::<Vec<_>>());
            prop_assert!(first_tags.is_empty() && second_tags.is_empty());
        }
    }
}
