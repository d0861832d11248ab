//! Objective backed by a line-oriented request/reply exchange.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use bb_optimizer::Objective;
use bb_types::{BridgeResult, ProtocolError};

/// Prefix of every evaluation request line.
pub const REQUEST_TAG: &str = "REQUEST_EVALUATION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    /// No request outstanding.
    Ready,
    /// Request written, reply not yet read.
    AwaitingReply,
    /// A reply was missing or malformed; no further requests are made.
    Failed,
}

/// Sends each point as a `REQUEST_EVALUATION` line on `output` and blocks on
/// `input` for the one-line numeric reply.
pub struct StdioEvaluator<R, W> {
    input: R,
    output: W,
    state: EvaluatorState,
    requests: u64,
    replies: u64,
    line: String,
}

impl<R: BufRead, W: Write> StdioEvaluator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            state: EvaluatorState::Ready,
            requests: 0,
            replies: 0,
            line: String::new(),
        }
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    /// Request lines written so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Replies successfully parsed so far.
    pub fn replies(&self) -> u64 {
        self.replies
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// One full round trip: write the request, read and parse the reply.
    pub fn request(&mut self, point: &[f64]) -> Result<f64, ProtocolError> {
        if self.state == EvaluatorState::Failed {
            return Err(ProtocolError::Poisoned);
        }
        self.requests += 1;
        let request = self.requests;

        let outcome = self.exchange(request, point);
        self.state = match &outcome {
            Ok(_) => EvaluatorState::Ready,
            Err(err) => {
                warn!(request, error = %err, "Evaluation exchange failed");
                EvaluatorState::Failed
            }
        };
        outcome
    }

    fn exchange(&mut self, request: u64, point: &[f64]) -> Result<f64, ProtocolError> {
        writeln!(self.output, "{REQUEST_TAG} {}", render_point(point))?;
        self.output.flush()?;
        self.state = EvaluatorState::AwaitingReply;

        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Err(ProtocolError::InputClosed { request });
        }
        let value = parse_reply(&self.line).ok_or_else(|| ProtocolError::InvalidReply {
            request,
            line: self.line.trim_end().to_string(),
        })?;

        self.replies += 1;
        debug!(request, value, "Received evaluation");
        Ok(value)
    }
}

impl<R: BufRead, W: Write> Objective for StdioEvaluator<R, W> {
    fn evaluate(&mut self, point: &[f64]) -> BridgeResult<f64> {
        Ok(self.request(point)?)
    }
}

/// Plain bracketed list, e.g. `[0.1, 2.3]` or `[0]`.
pub fn render_point(point: &[f64]) -> String {
    let items: Vec<String> = point.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Parse one reply line; surrounding whitespace is ignored.
pub fn parse_reply(line: &str) -> Option<f64> {
    line.trim().parse().ok()
}
