//! Run configuration decoded from the single JSON command-line argument.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::option_error;

/// Starting point and bounds for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadsConfig {
    /// Starting point. Its length is the search dimension.
    pub x0: Vec<f64>,
    /// Hard lower bounds; no point below them is ever requested.
    pub lower_bounds: Vec<f64>,
    /// Hard upper bounds.
    pub upper_bounds: Vec<f64>,
    /// Lower edge of the region where the optimum is expected.
    pub plausible_lower_bounds: Vec<f64>,
    /// Upper edge of the region where the optimum is expected.
    pub plausible_upper_bounds: Vec<f64>,

    /// Optional tuning knobs.
    #[serde(default)]
    pub options: BadsOptions,
}

impl BadsConfig {
    /// Decode and check a configuration from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.options.validate()?;
        Ok(config)
    }

    pub fn dimension(&self) -> usize {
        self.x0.len()
    }
}

/// Optimizer settings. Unset fields take dimension-dependent defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BadsOptions {
    /// Maximum number of objective evaluations (default `500 * D`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fun_evals: Option<usize>,

    /// Maximum number of iterations (default `200 * D`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<usize>,

    /// Stop once the poll size drops below this (default `1e-6`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol_mesh: Option<f64>,

    /// Minimum improvement over `tol_stall_iters` iterations (default `1e-3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol_fun: Option<f64>,

    /// Window for the `tol_fun` stall check (default `4 + D / 2`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tol_stall_iters: Option<usize>,

    /// Random points drawn from the plausible box after `x0` (default `D`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_points: Option<usize>,

    /// Initial poll size, in units of the plausible box width (default `0.5`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_size_init: Option<f64>,

    /// Candidates scored by the surrogate per search step (default `32 * D`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_candidates: Option<usize>,

    /// Seed for the candidate generator. Drawn at random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u32>,
}

impl BadsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_fun_evals(mut self, n: usize) -> Self {
        self.max_fun_evals = Some(n);
        self
    }

    pub fn with_max_iter(mut self, n: usize) -> Self {
        self.max_iter = Some(n);
        self
    }

    pub fn with_tol_mesh(mut self, tol: f64) -> Self {
        self.tol_mesh = Some(tol);
        self
    }

    pub fn with_tol_fun(mut self, tol: f64) -> Self {
        self.tol_fun = Some(tol);
        self
    }

    pub fn with_init_points(mut self, n: usize) -> Self {
        self.init_points = Some(n);
        self
    }

    pub fn with_random_seed(mut self, seed: u32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Reject settings that would make the optimizer loop forever or never start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fun_evals == Some(0) {
            return Err(option_error!("max_fun_evals", "must be at least 1"));
        }
        if self.max_iter == Some(0) {
            return Err(option_error!("max_iter", "must be at least 1"));
        }
        if self.search_candidates == Some(0) {
            return Err(option_error!("search_candidates", "must be at least 1"));
        }
        if let Some(tol) = self.tol_mesh {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(option_error!("tol_mesh", "must be positive, got {tol}"));
            }
        }
        if let Some(tol) = self.tol_fun {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(option_error!("tol_fun", "must be non-negative, got {tol}"));
            }
        }
        if let Some(size) = self.poll_size_init {
            if !(size.is_finite() && size > 0.0 && size <= 1.0) {
                return Err(option_error!("poll_size_init", "must be in (0, 1], got {size}"));
            }
        }
        Ok(())
    }
}
