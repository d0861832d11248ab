//! Evaluation history and run lifecycle tracking.

use chrono::{DateTime, Utc};

/// Lifecycle state of an optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
    Failed,
}

/// Aggregate status of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub state: RunState,
    pub iterations: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
            iterations: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = RunState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_finished(&mut self) {
        self.state = RunState::Finished;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self) {
        self.state = RunState::Failed;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock seconds between start and finish (or now, while running).
    pub fn elapsed_seconds(&self) -> f64 {
        match self.started_at {
            Some(start) => {
                let end = self.finished_at.unwrap_or_else(Utc::now);
                (end - start).num_microseconds().unwrap_or(0) as f64 / 1e6
            }
            None => 0.0,
        }
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// One answered request.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Point as sent to the objective.
    pub x: Vec<f64>,
    /// Same point in normalized free coordinates.
    pub u: Vec<f64>,
    pub value: f64,
}

/// Every evaluation of a run, in request order, plus the incumbent.
#[derive(Debug, Clone, Default)]
pub struct EvaluationHistory {
    evaluations: Vec<Evaluation>,
    best: Option<usize>,
}

impl EvaluationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Record an evaluation. Returns `true` if it became the new incumbent.
    pub fn push(&mut self, evaluation: Evaluation) -> bool {
        let improves = evaluation.value.is_finite()
            && match self.best() {
                None => true,
                Some(current) => evaluation.value < current.value,
            };
        self.evaluations.push(evaluation);
        if improves {
            self.best = Some(self.evaluations.len() - 1);
        }
        improves
    }

    /// Lowest finite evaluation so far.
    pub fn best(&self) -> Option<&Evaluation> {
        self.best.map(|i| &self.evaluations[i])
    }

    pub fn best_value(&self) -> f64 {
        self.best().map_or(f64::INFINITY, |e| e.value)
    }

    /// Whether a point within `tolerance` (max-norm, normalized space) was already evaluated.
    pub fn contains(&self, u: &[f64], tolerance: f64) -> bool {
        self.evaluations.iter().any(|e| {
            e.u.iter()
                .zip(u)
                .all(|(a, b)| (a - b).abs() <= tolerance)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Evaluation> {
        self.evaluations.iter()
    }

    /// Values in request order.
    pub fn values(&self) -> Vec<f64> {
        self.evaluations.iter().map(|e| e.value).collect()
    }
}
