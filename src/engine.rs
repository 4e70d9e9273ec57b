//! Rule resolution and execution engine.
//!
//! This module is the entry point for everything between a declarative rule
//! table and a finished validation result. It is split into focused
//! submodules under `src/engine/` while keeping paths stable (for example
//! `crate::engine::Validation` and `crate::engine::compile`).
//!
//! ## How the parts work together
//!
//! One validation run is a pipeline:
//!
//! ```text
//! rule table (RuleSpec) ──┐
//!                         │  compile(specs, scene)        (compile.rs)
//!                         └──────────────┬───────────────
//!                                        │  scene filter, pipe expansion,
//!                                        │  option extraction, trait flags
//!                                        v
//!                           Validation::execute            (pipeline.rs)
//!                             - resolve field values       (path.rs)
//!                             - apply filter pipelines
//!                             - dispatch checkers          (lookup.rs)
//!                             - record outcomes            (result.rs)
//!                                        │
//!                                        v
//!                           ResultStore: errors + safe data
//! ```
//!
//! Execution is strictly sequential in declaration order. That is a feature,
//! not a simplification: filters write their output back into the record, so
//! later rules must observe what earlier rules produced.
//!
//! ## Responsibilities by module
//!
//! - `path.rs`: dotted/wildcarded field-path resolution into nested data.
//! - `lookup.rs`: the tiered name-to-callable resolution chain and the
//!   process-wide registries.
//! - `compile.rs`: turns declarative `RuleSpec` entries into normalized
//!   `Rule`s and filters them for the active scene.
//! - `pipeline.rs`: the run state machine and the per-rule-field step loop.
//! - `result.rs`: the error/safe-data accumulator.
//! - `metrics.rs`: cheap per-run counters and timing.

#[path = "engine/compile.rs"]
mod compile;
#[path = "engine/lookup.rs"]
mod lookup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/path.rs"]
pub(crate) mod path;
#[path = "engine/pipeline.rs"]
mod pipeline;
#[path = "engine/result.rs"]
mod result;

pub use metrics::RunMetrics;
pub use pipeline::{RunState, Validation};
pub use result::ErrorEntry;

pub use compile::RuleSpec;
pub(crate) use compile::CheckerTraits;
pub use lookup::{register_checker, register_filter};
pub(crate) use result::ResultStore;
