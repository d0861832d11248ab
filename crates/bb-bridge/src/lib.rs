//! # bb-bridge
//!
//! Connects the optimizer to an evaluator on the other end of stdin/stdout.
//!
//! Every candidate point goes out as a `REQUEST_EVALUATION [..]` line and is
//! answered by one line holding a number; when the optimizer finishes, its
//! result is printed once as `FINAL_RESULT {..}`.

pub mod driver;
pub mod evaluator;
pub mod serializer;

pub use driver::{render_result, run, RESULT_TAG};
pub use evaluator::{parse_reply, render_point, EvaluatorState, StdioEvaluator, REQUEST_TAG};
pub use serializer::{jsonify, to_json_value};
