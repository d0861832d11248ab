//! Single-shot run: configuration in, evaluation exchange, one result line out.

use std::io::{BufRead, Write};

use tracing::info;

use bb_optimizer::Bads;
use bb_types::{BadsConfig, BridgeResult, ResultMap};

use crate::evaluator::StdioEvaluator;
use crate::serializer::jsonify;

/// Prefix of the final result line.
pub const RESULT_TAG: &str = "FINAL_RESULT";

/// Parse `config_text`, optimize against the evaluator on `input`/`output`,
/// then write the `FINAL_RESULT` line.
///
/// Nothing is written to `output` if the configuration or the problem is
/// invalid. Any error during the exchange ends the run without a result line.
pub fn run<R: BufRead, W: Write>(config_text: &str, input: R, output: W) -> BridgeResult<()> {
    let config = BadsConfig::from_json(config_text)?;
    info!(dimension = config.dimension(), "Loaded configuration");

    let mut evaluator = StdioEvaluator::new(input, output);
    let result = Bads::from_config(&mut evaluator, &config)?.optimize()?;
    info!(
        requests = evaluator.requests(),
        replies = evaluator.replies(),
        "Optimization finished"
    );

    let (_, mut output) = evaluator.into_parts();
    writeln!(output, "{RESULT_TAG} {}", render_result(result))?;
    output.flush()?;
    Ok(())
}

/// JSON text for the result line.
///
/// `fun` (the objective handle) is dropped first; callers only get the
/// numeric outcome.
pub fn render_result(mut result: ResultMap) -> String {
    result.remove("fun");
    jsonify(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_types::ResultValue;
    use serde_json::Value;

    #[test]
    fn render_result_drops_fun() {
        let mut result = ResultMap::new();
        result.insert("fun".into(), ResultValue::Callable("objective".into()));
        result.insert("fval".into(), ResultValue::Float64(0.5));
        result.insert("x".into(), ResultValue::vector(vec![0.25]));

        let text = render_result(result);
        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert!(decoded.get("fun").is_none());
        assert_eq!(decoded["fval"], 0.5);
        assert_eq!(decoded["x"][0], 0.25);
    }

    #[test]
    fn render_result_without_fun_is_unchanged() {
        let mut result = ResultMap::new();
        result.insert("success".into(), ResultValue::Bool(false));
        assert_eq!(render_result(result), r#"{"success":false}"#);
    }
}
