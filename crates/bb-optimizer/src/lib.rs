//! # bb-optimizer
//!
//! Bounded black-box minimization for bads-bridge.
//!
//! Provides the [`Objective`] seam the bridge plugs its evaluator into, problem
//! validation and normalization, a Gaussian-process surrogate, candidate
//! generators, evaluation history tracking, and the [`Bads`] driver that
//! alternates a surrogate-guided search step with a coordinate poll step.

mod bads;
mod history;
mod objective;
mod options;
mod problem;
mod search;
mod surrogate;

pub use bads::{Bads, Termination, ALGORITHM_NAME};
pub use history::{Evaluation, EvaluationHistory, RunState, RunStatus};
pub use objective::{objective_fn, FnObjective, Objective, ScriptedObjective};
pub use options::ResolvedOptions;
pub use problem::Problem;
pub use search::{poll_directions, IncumbentPerturbation, PlausibleSampler, SearchStrategy};
pub use surrogate::GaussianProcess;
