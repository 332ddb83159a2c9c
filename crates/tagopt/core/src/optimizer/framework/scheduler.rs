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

//! Single-module fixpoint loop
//!
//! The loop seeds the tag set with [`NEW_CODE`], refreshes once, and then pops
//! passes in FIFO order. After each pass the queue is only recomputed when it
//! ran dry or when a pass emitted `new_code`, so one refresh may authorize
//! several passes in a row. The loop ends when a refresh queues nothing.

use crate::config::OptimizationConfig;
use crate::error::{OptimizeError, OptimizeResult};
use crate::optimizer::framework::metrics::{ModuleMetrics, PassMetrics};
use crate::optimizer::framework::pass::{Pass, PassContext};
use crate::optimizer::framework::queue::WorkQueue;
use crate::optimizer::framework::rules::EligibilityTable;
use crate::optimizer::framework::tags::{NEW_CODE, TagSet};
use crate::optimizer::registry::{ModuleId, ModuleRegistry};
use std::time::Instant;
use tracing::{debug, error, info};

/// Scheduler for ordering and executing passes on one module at a time
pub struct Scheduler<P> {
    table: EligibilityTable<P>,
    config: OptimizationConfig,
}

impl<P: Pass> Scheduler<P> {
    /// Create a scheduler; the configuration is fixed from here on
    pub fn new(table: EligibilityTable<P>, config: OptimizationConfig) -> OptimizeResult<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    pub fn table(&self) -> &EligibilityTable<P> {
        &self.table
    }

    /// Optimize a registered module in place until no pass is eligible
    pub fn optimize_module(&self, id: ModuleId, registry: &mut ModuleRegistry<P::Tree>) -> OptimizeResult<ModuleMetrics> {
        let name = registry.name(id)?.to_string();
        let mut tree = registry.check_out(id)?;
        let result = self.optimize_tree(&mut tree, id, &name, registry);
        registry.check_in(id, tree)?;
        result
    }

    /// Run the fixpoint loop on a tree the caller holds exclusively.
    ///
    /// `registry` receives modules discovered by passes.
    pub fn optimize_tree(&self, tree: &mut P::Tree, id: ModuleId, name: &str, registry: &mut ModuleRegistry<P::Tree>) -> OptimizeResult<ModuleMetrics> {
        if self.config.show_progress {
            info!(module = %name, "Doing module local optimizations for '{}'", name);
        }

        let mut queue = WorkQueue::new();
        let mut tags = TagSet::new();
        let mut metrics = ModuleMetrics::new(id, name);

        // Treat the whole tree as freshly produced
        tags.add(NEW_CODE);
        self.refresh(&mut tags, &mut queue, &mut metrics)?;

        while let Some(pass) = queue.pop_front() {
            debug!(module = %name, pass = pass.name(), description = pass.description(), "Applying optimization");

            let started = Instant::now();
            let mut cx = PassContext::new(id, name, &mut tags, registry);
            pass.execute(tree, &mut cx).inspect_err(|err| {
                error!(module = %name, pass = pass.name(), error = %err, "Optimization failed");
            })?;
            let tags_emitted = cx.emitted();

            metrics.passes.push(PassMetrics {
                pass_name: pass.name(),
                duration_ms: started.elapsed().as_millis(),
                tags_emitted,
            });

            if queue.is_empty() || tags.contains(NEW_CODE) {
                self.refresh(&mut tags, &mut queue, &mut metrics)?;
            }
        }

        debug!(module = %name, passes = metrics.total_passes(), refreshes = metrics.refresh_cycles, "Module reached fixpoint");
        Ok(metrics)
    }

    fn refresh(&self, tags: &mut TagSet, queue: &mut WorkQueue<P>, metrics: &mut ModuleMetrics) -> OptimizeResult<()> {
        self.table.refresh(tags, &self.config, queue);
        metrics.refresh_cycles += 1;

        // Diagnostic cap: only a refresh that keeps the loop alive counts against it
        if let Some(limit) = self.config.max_refresh_cycles {
            if metrics.refresh_cycles > limit && !queue.is_empty() {
                return Err(OptimizeError::RefreshLimitExceeded {
                    module: metrics.module_name.clone(),
                    limit,
                });
            }
        }
        Ok(())
    }
}
