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

//! Tag-driven optimization scheduling
//!
//! Passes rewrite a module tree and emit tags describing what they changed.
//! An eligibility table turns those tags into follow-up passes until nothing
//! is eligible anymore, and the whole-program driver repeats this for every
//! module discovered along the way.

pub mod config;
pub mod error;
pub mod logging;
pub mod optimizer;

pub use config::{ConfigFlag, OptimizationConfig};
pub use error::{OptimizeError, OptimizeResult};
pub use optimizer::driver::{DriverReport, WholeProgramDriver};
pub use optimizer::framework::pass::{Pass, PassContext};
pub use optimizer::framework::queue::WorkQueue;
pub use optimizer::framework::rules::{Condition, EligibilityTable, Rule};
pub use optimizer::framework::scheduler::Scheduler;
pub use optimizer::framework::tags::TagSet;
pub use optimizer::registry::{ModuleId, ModuleRegistry};
