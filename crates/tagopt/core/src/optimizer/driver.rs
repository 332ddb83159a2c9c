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

//! Whole-program optimization driver
//!
//! Optimizing one module can register further modules, so the driver sweeps
//! the registry repeatedly and only stops once a full sweep optimized nothing.

use crate::error::OptimizeResult;
use crate::optimizer::framework::metrics::ModuleMetrics;
use crate::optimizer::framework::pass::Pass;
use crate::optimizer::framework::scheduler::Scheduler;
use crate::optimizer::registry::{ModuleId, ModuleRegistry};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Summary of a whole-program run
#[derive(Debug, Clone, Default)]
pub struct DriverReport {
    /// Per-module metrics in optimization order, entry module first
    pub modules: Vec<ModuleMetrics>,
    /// Full sweeps after the entry module, including the final empty one
    pub sweeps: usize,
}

impl DriverReport {
    /// Names of optimized modules in optimization order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.module_name.as_str()).collect()
    }

    pub fn total_passes(&self) -> usize {
        self.modules.iter().map(ModuleMetrics::total_passes).sum()
    }
}

/// Drives the scheduler over every module reachable from the entry point
pub struct WholeProgramDriver<P: Pass> {
    scheduler: Scheduler<P>,
    registry: ModuleRegistry<P::Tree>,
    done: HashSet<ModuleId>,
}

impl<P: Pass> WholeProgramDriver<P> {
    pub fn new(scheduler: Scheduler<P>, registry: ModuleRegistry<P::Tree>) -> Self {
        Self {
            scheduler,
            registry,
            done: HashSet::new(),
        }
    }

    /// Create a driver whose registry holds only the entry module
    pub fn from_entry(scheduler: Scheduler<P>, name: impl Into<String>, tree: P::Tree) -> (Self, ModuleId) {
        let (registry, entry) = ModuleRegistry::with_entry(name, tree);
        (Self::new(scheduler, registry), entry)
    }

    /// Optimize the entry module and then every module it leads to
    #[instrument(skip_all, fields(entry = %entry))]
    pub fn optimize_whole(&mut self, entry: ModuleId) -> OptimizeResult<DriverReport> {
        let mut report = DriverReport::default();

        if !self.is_done(entry) {
            report.modules.push(self.optimize_one(entry)?);
        }

        loop {
            let mut progressed = false;

            // Modules registered during this sweep are picked up by the next one
            for id in self.registry.ids() {
                if self.is_done(id) {
                    continue;
                }
                report.modules.push(self.optimize_one(id)?);
                progressed = true;
            }

            report.sweeps += 1;
            if !progressed {
                break;
            }
        }

        info!(
            modules = report.modules.len(),
            passes = report.total_passes(),
            sweeps = report.sweeps,
            "Whole program optimization finished"
        );
        Ok(report)
    }

    fn optimize_one(&mut self, id: ModuleId) -> OptimizeResult<ModuleMetrics> {
        let metrics = self.scheduler.optimize_module(id, &mut self.registry)?;
        self.done.insert(id);

        if self.scheduler.config().show_progress {
            info!("Finished. {} more modules to go.", self.pending_count());
        }
        Ok(metrics)
    }

    pub fn is_done(&self, id: ModuleId) -> bool {
        self.done.contains(&id)
    }

    pub fn done_count(&self) -> usize {
        self.done.len()
    }

    /// Known modules that have not been optimized yet
    pub fn pending_count(&self) -> usize {
        self.registry.len() - self.done.len()
    }

    pub fn registry(&self) -> &ModuleRegistry<P::Tree> {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler<P> {
        &self.scheduler
    }

    pub fn into_registry(self) -> ModuleRegistry<P::Tree> {
        self.registry
    }
}
