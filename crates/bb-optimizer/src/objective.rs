//! The function being minimized.

use std::collections::VecDeque;

use bb_types::{BridgeResult, ProtocolError};

/// Anything that can score a candidate point.
///
/// Calls happen one at a time, in the order the optimizer chooses, and each
/// call must return before the next point is proposed.
pub trait Objective {
    fn evaluate(&mut self, point: &[f64]) -> BridgeResult<f64>;
}

impl<O: Objective + ?Sized> Objective for &mut O {
    fn evaluate(&mut self, point: &[f64]) -> BridgeResult<f64> {
        (**self).evaluate(point)
    }
}

/// Adapter turning an infallible closure into an [`Objective`].
pub struct FnObjective<F> {
    f: F,
}

/// Wrap a plain function of the point.
pub fn objective_fn<F>(f: F) -> FnObjective<F>
where
    F: FnMut(&[f64]) -> f64,
{
    FnObjective { f }
}

impl<F> Objective for FnObjective<F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn evaluate(&mut self, point: &[f64]) -> BridgeResult<f64> {
        Ok((self.f)(point))
    }
}

/// Replays canned replies and records every point it was asked about.
///
/// Running out of replies behaves like a closed input stream.
#[derive(Debug, Clone, Default)]
pub struct ScriptedObjective {
    replies: VecDeque<f64>,
    requests: Vec<Vec<f64>>,
}

impl ScriptedObjective {
    pub fn new(replies: impl IntoIterator<Item = f64>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[Vec<f64>] {
        &self.requests
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Objective for ScriptedObjective {
    fn evaluate(&mut self, point: &[f64]) -> BridgeResult<f64> {
        self.requests.push(point.to_vec());
        let request = self.requests.len() as u64;
        self.replies
            .pop_front()
            .ok_or_else(|| ProtocolError::InputClosed { request }.into())
    }
}
