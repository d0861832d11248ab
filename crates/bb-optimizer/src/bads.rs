//! Bounded black-box minimization by direct search with a surrogate search step.
//!
//! Each iteration first asks a Gaussian-process surrogate for the most
//! promising perturbation of the incumbent (search step). If that does not
//! improve on the incumbent, the coordinate directions around the incumbent
//! are polled, most promising first, until one improves (poll step). Success
//! doubles the poll size, failure halves it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use bb_types::{BadsConfig, BadsOptions, BridgeResult, OptimizerError, ResultMap, ResultValue};

use crate::history::{Evaluation, EvaluationHistory, RunStatus};
use crate::objective::Objective;
use crate::options::ResolvedOptions;
use crate::problem::Problem;
use crate::search::{poll_directions, IncumbentPerturbation, PlausibleSampler, SearchStrategy};
use crate::surrogate::GaussianProcess;

pub const ALGORITHM_NAME: &str = "Bayesian adaptive direct search";

const POLL_SIZE_MAX: f64 = 1.0;
/// Max-norm distance, in normalized units, under which two points are the same.
const DUPLICATE_TOLERANCE: f64 = 1e-12;
const LCB_KAPPA: f64 = 2.0;
const SURROGATE_MAX_POINTS: usize = 100;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    MeshTolerance,
    StallTolerance,
    MaxFunEvals,
    MaxIter,
}

impl Termination {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MeshTolerance => "Optimization terminated: mesh size less than tol_mesh.",
            Self::StallTolerance => {
                "Optimization terminated: change in the function value less than tol_fun."
            }
            Self::MaxFunEvals => {
                "Optimization terminated: reached maximum number of function evaluations max_fun_evals."
            }
            Self::MaxIter => {
                "Optimization terminated: reached maximum number of iterations max_iter."
            }
        }
    }

    /// Converged, as opposed to running out of budget.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::MeshTolerance | Self::StallTolerance)
    }
}

/// Optimizer handle: construct with an objective and the problem, then [`Bads::optimize`].
pub struct Bads<O> {
    objective: O,
    problem: Problem,
    options: ResolvedOptions,
}

impl<O: Objective> Bads<O> {
    pub fn new(
        objective: O,
        x0: Vec<f64>,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
        plausible_lower_bounds: Vec<f64>,
        plausible_upper_bounds: Vec<f64>,
    ) -> Result<Self, OptimizerError> {
        Self::with_options(
            objective,
            x0,
            lower_bounds,
            upper_bounds,
            plausible_lower_bounds,
            plausible_upper_bounds,
            &BadsOptions::default(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_options(
        objective: O,
        x0: Vec<f64>,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
        plausible_lower_bounds: Vec<f64>,
        plausible_upper_bounds: Vec<f64>,
        options: &BadsOptions,
    ) -> Result<Self, OptimizerError> {
        let problem = Problem::new(
            x0,
            lower_bounds,
            upper_bounds,
            plausible_lower_bounds,
            plausible_upper_bounds,
        )?;
        Ok(Self::from_problem(objective, problem, options))
    }

    pub fn from_config(objective: O, config: &BadsConfig) -> Result<Self, OptimizerError> {
        let problem = Problem::from_config(config)?;
        Ok(Self::from_problem(objective, problem, &config.options))
    }

    pub fn from_problem(objective: O, problem: Problem, options: &BadsOptions) -> Self {
        let options = ResolvedOptions::resolve(options, problem.free_dimension());
        Self {
            objective,
            problem,
            options,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Run to completion. Objective failures abort the run and are returned as-is.
    pub fn optimize(self) -> BridgeResult<ResultMap> {
        let seed = self
            .options
            .random_seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        let mut run = Run::new(self, seed);
        run.status.mark_running();
        info!(
            dimension = run.problem.dimension(),
            free = run.problem.free_dimension(),
            seed,
            "Starting optimization"
        );

        match run.execute() {
            Ok(termination) => {
                run.status.mark_finished();
                info!(
                    state = ?run.status.state,
                    func_count = run.history.len(),
                    iterations = run.status.iterations,
                    fval = run.history.best_value(),
                    "{}",
                    termination.message()
                );
                Ok(run.into_result(termination, seed))
            }
            Err(err) => {
                run.status.mark_failed();
                warn!(
                    state = ?run.status.state,
                    error = %err,
                    func_count = run.history.len(),
                    "Optimization aborted"
                );
                Err(err)
            }
        }
    }
}

struct Run<O> {
    objective: O,
    problem: Problem,
    options: ResolvedOptions,
    rng: ChaCha8Rng,
    history: EvaluationHistory,
    status: RunStatus,
    poll_size: f64,
    surrogate: Option<GaussianProcess>,
    /// Incumbent value at the end of each iteration.
    progress: Vec<f64>,
}

impl<O: Objective> Run<O> {
    fn new(bads: Bads<O>, seed: u32) -> Self {
        let poll_size = bads.options.poll_size_init;
        Self {
            objective: bads.objective,
            problem: bads.problem,
            options: bads.options,
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
            history: EvaluationHistory::new(),
            status: RunStatus::new(),
            poll_size,
            surrogate: None,
            progress: Vec::new(),
        }
    }

    fn execute(&mut self) -> BridgeResult<Termination> {
        let x0 = self.problem.x0().to_vec();
        let start = self.problem.normalize(&x0);
        self.evaluate(x0, start)?;

        let design = PlausibleSampler::new(self.problem.free_dimension())
            .suggest(&mut self.rng, self.options.init_points);
        for mut u in design {
            if self.budget_exhausted() {
                break;
            }
            self.problem.project(&mut u);
            self.evaluate_normalized(u)?;
        }

        loop {
            if let Some(termination) = self.check_termination() {
                return Ok(termination);
            }
            self.status.iterations += 1;

            let improved = self.search_step()? || self.poll_step()?;
            if improved {
                self.poll_size = (self.poll_size * 2.0).min(POLL_SIZE_MAX);
            } else {
                self.poll_size *= 0.5;
            }
            self.progress.push(self.history.best_value());

            debug!(
                iteration = self.status.iterations,
                improved,
                poll_size = self.poll_size,
                fval = self.history.best_value(),
                func_count = self.history.len(),
                "Iteration complete"
            );
        }
    }

    fn check_termination(&self) -> Option<Termination> {
        if self.poll_size < self.options.tol_mesh {
            return Some(Termination::MeshTolerance);
        }
        if self.budget_exhausted() {
            return Some(Termination::MaxFunEvals);
        }
        if self.status.iterations >= self.options.max_iter {
            return Some(Termination::MaxIter);
        }
        let window = self.options.tol_stall_iters;
        if window > 0 && self.progress.len() > window {
            let earlier = self.progress[self.progress.len() - 1 - window];
            // NaN when both are infinite, which never counts as a stall.
            if earlier - self.history.best_value() < self.options.tol_fun {
                return Some(Termination::StallTolerance);
            }
        }
        None
    }

    fn budget_exhausted(&self) -> bool {
        self.history.len() >= self.options.max_fun_evals
    }

    /// Normalized incumbent; `x0` until some finite value has been seen.
    fn incumbent(&self) -> Vec<f64> {
        match self.history.best() {
            Some(best) => best.u.clone(),
            None => self.problem.normalize(self.problem.x0()),
        }
    }

    fn evaluate_normalized(&mut self, u: Vec<f64>) -> BridgeResult<Option<f64>> {
        let x = self.problem.denormalize(&u);
        self.evaluate(x, u)
    }

    /// Send `x` (whose normalized form is `u`) unless `u` was already evaluated.
    /// Returns the value if a request was made.
    fn evaluate(&mut self, x: Vec<f64>, u: Vec<f64>) -> BridgeResult<Option<f64>> {
        if self.history.contains(&u, DUPLICATE_TOLERANCE) {
            debug!(?u, "Skipping already evaluated point");
            return Ok(None);
        }
        let value = self.objective.evaluate(&x)?;
        if value.is_nan() || value == f64::NEG_INFINITY {
            return Err(OptimizerError::NonFiniteObjective { value, point: x }.into());
        }

        let improved = self.history.push(Evaluation { x, u, value });
        debug!(request = self.history.len(), value, improved, "Evaluated point");
        Ok(Some(value))
    }

    fn fit_surrogate(&self) -> Option<GaussianProcess> {
        let incumbent = self.incumbent();
        let mut nearest: Vec<&Evaluation> =
            self.history.iter().filter(|e| e.value.is_finite()).collect();
        if nearest.len() < 2 {
            return None;
        }
        nearest.sort_by(|a, b| {
            squared_distance(&a.u, &incumbent).total_cmp(&squared_distance(&b.u, &incumbent))
        });
        nearest.truncate(SURROGATE_MAX_POINTS);

        let points: Vec<Vec<f64>> = nearest.iter().map(|e| e.u.clone()).collect();
        let values: Vec<f64> = nearest.iter().map(|e| e.value).collect();
        let gp = GaussianProcess::fit(&points, &values);
        if gp.is_none() {
            warn!(points = points.len(), "Surrogate fit failed; skipping search step");
        }
        gp
    }

    fn search_step(&mut self) -> BridgeResult<bool> {
        self.surrogate = self.fit_surrogate();
        if self.surrogate.is_none() || self.budget_exhausted() {
            return Ok(false);
        }

        let candidates = IncumbentPerturbation::new(self.incumbent(), 2.0 * self.poll_size)
            .suggest(&mut self.rng, self.options.search_candidates);

        let choice = match self.surrogate.as_ref() {
            Some(gp) => candidates
                .into_iter()
                .map(|mut u| {
                    self.problem.project(&mut u);
                    u
                })
                .filter(|u| !self.history.contains(u, DUPLICATE_TOLERANCE))
                .map(|u| {
                    let score = gp.lower_confidence_bound(&u, LCB_KAPPA);
                    (u, score)
                })
                .min_by(|a, b| a.1.total_cmp(&b.1)),
            None => None,
        };
        let Some((u, lcb)) = choice else {
            debug!("Search step produced no new candidate");
            return Ok(false);
        };

        let before = self.history.best_value();
        debug!(lcb, "Search step candidate");
        Ok(matches!(self.evaluate_normalized(u)?, Some(value) if value < before))
    }

    fn poll_step(&mut self) -> BridgeResult<bool> {
        let incumbent = self.incumbent();
        let mut candidates: Vec<Vec<f64>> = poll_directions(self.problem.free_dimension())
            .into_iter()
            .map(|direction| {
                let mut u: Vec<f64> = incumbent
                    .iter()
                    .zip(&direction)
                    .map(|(c, d)| c + self.poll_size * d)
                    .collect();
                self.problem.project(&mut u);
                u
            })
            .filter(|u| !self.history.contains(u, DUPLICATE_TOLERANCE))
            .collect();

        if let Some(gp) = &self.surrogate {
            candidates.sort_by(|a, b| gp.predict(a).0.total_cmp(&gp.predict(b).0));
        }

        let before = self.history.best_value();
        for u in candidates {
            if self.budget_exhausted() {
                return Ok(false);
            }
            if let Some(value) = self.evaluate_normalized(u)? {
                if value < before {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn into_result(self, termination: Termination, seed: u32) -> ResultMap {
        let x0 = self.problem.x0().to_vec();
        let (x, fval) = match self.history.best() {
            Some(best) => (best.x.clone(), best.value),
            None => (x0.clone(), f64::INFINITY),
        };
        let problem_type = if self.problem.is_bounded() {
            "bound constraints"
        } else {
            "unconstrained"
        };

        let mut result = ResultMap::new();
        result.insert("fun".into(), ResultValue::Callable("objective".into()));
        result.insert("x".into(), x.into());
        result.insert("x0".into(), x0.into());
        result.insert("fval".into(), ResultValue::Float64(fval));
        result.insert("fsd".into(), ResultValue::Float64(0.0));
        result.insert("iterations".into(), ResultValue::Int64(self.status.iterations as i64));
        result.insert("func_count".into(), ResultValue::Int64(self.history.len() as i64));
        result.insert("mesh_size".into(), ResultValue::Float64(self.poll_size));
        result.insert(
            "total_time".into(),
            ResultValue::Float64(self.status.elapsed_seconds()),
        );
        result.insert("yval_vec".into(), self.history.values().into());
        result.insert("algorithm".into(), ALGORITHM_NAME.into());
        result.insert("problem_type".into(), problem_type.into());
        result.insert("target_type".into(), "deterministic".into());
        result.insert("non_box_cons".into(), false.into());
        result.insert("message".into(), termination.message().into());
        result.insert("success".into(), termination.is_success().into());
        result.insert("random_seed".into(), ResultValue::Int64(i64::from(seed)));
        result.insert("version".into(), env!("CARGO_PKG_VERSION").into());
        result
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
