//! Conversion of optimizer results to JSON.
//!
//! Arrays become nested lists following their shape, 64-bit scalars become
//! plain numbers and containers are converted recursively. Non-finite floats
//! have no JSON form and are written as `null`. Callables cannot be converted;
//! [`jsonify`] then falls back on the textual form of the whole result.

use ndarray::ArrayViewD;
use serde_json::{Map, Number, Value};
use tracing::error;

use bb_types::{ResultMap, ResultValue, SerializationError};

/// Convert one value. `Err` names the first value that has no JSON form.
pub fn to_json_value(value: &ResultValue) -> Result<Value, SerializationError> {
    convert(value, "$")
}

/// Serialize a result map, falling back on its `Display` form if any entry
/// cannot be converted.
pub fn jsonify(result: &ResultMap) -> String {
    match encode(result) {
        Ok(text) => text,
        Err(err) => {
            error!(error = %err, "Error converting result to JSON, falling back on string");
            ResultValue::Map(result.clone()).to_string()
        }
    }
}

fn encode(result: &ResultMap) -> Result<String, SerializationError> {
    let value = convert_map(result, "$")?;
    Ok(serde_json::to_string(&value)?)
}

fn convert(value: &ResultValue, path: &str) -> Result<Value, SerializationError> {
    match value {
        ResultValue::Null => Ok(Value::Null),
        ResultValue::Bool(v) => Ok(Value::Bool(*v)),
        ResultValue::Int64(v) => Ok(Value::from(*v)),
        ResultValue::Float64(v) => Ok(float(*v)),
        ResultValue::Str(v) => Ok(Value::String(v.clone())),
        ResultValue::Array(v) => Ok(array(v.view())),
        ResultValue::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ResultValue::Map(map) => convert_map(map, path),
        ResultValue::Callable(_) => Err(SerializationError::Unsupported {
            kind: value.kind(),
            path: path.to_string(),
        }),
    }
}

fn convert_map(map: &ResultMap, path: &str) -> Result<Value, SerializationError> {
    let mut object = Map::with_capacity(map.len());
    for (key, value) in map {
        object.insert(key.clone(), convert(value, &format!("{path}.{key}"))?);
    }
    Ok(Value::Object(object))
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn array(view: ArrayViewD<'_, f64>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, |v| float(*v));
    }
    Value::Array(view.outer_iter().map(array).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, ArrayD, IxDyn};
    use serde_json::json;

    #[test]
    fn arrays_become_nested_lists() {
        assert_eq!(
            to_json_value(&ResultValue::vector(vec![0.5, -1.0])).unwrap(),
            json!([0.5, -1.0])
        );
        let grid: ResultValue = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn().into();
        assert_eq!(
            to_json_value(&grid).unwrap(),
            json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
        );
        let empty = ResultValue::Array(ArrayD::zeros(IxDyn(&[2, 0])));
        assert_eq!(to_json_value(&empty).unwrap(), json!([[], []]));
    }

    #[test]
    fn zero_dimensional_array_is_a_scalar() {
        let scalar = ResultValue::Array(ArrayD::from_elem(IxDyn(&[]), 2.5));
        assert_eq!(to_json_value(&scalar).unwrap(), json!(2.5));
    }

    #[test]
    fn scalars_become_plain_numbers() {
        assert_eq!(to_json_value(&ResultValue::Int64(42)).unwrap(), json!(42));
        assert_eq!(to_json_value(&ResultValue::Float64(0.25)).unwrap(), json!(0.25));
        assert_eq!(to_json_value(&ResultValue::Bool(true)).unwrap(), json!(true));
        assert_eq!(to_json_value(&ResultValue::Null).unwrap(), Value::Null);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(to_json_value(&ResultValue::Float64(f64::INFINITY)).unwrap(), Value::Null);
        assert_eq!(
            to_json_value(&ResultValue::vector(vec![1.0, f64::NAN])).unwrap(),
            json!([1.0, null])
        );
    }

    #[test]
    fn callables_are_reported_with_their_path() {
        let value = ResultValue::List(vec![
            ResultValue::Int64(1),
            ResultValue::Callable("objective".into()),
        ]);
        match to_json_value(&value) {
            Err(SerializationError::Unsupported { kind, path }) => {
                assert_eq!(kind, "callable");
                assert_eq!(path, "$[1]");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn jsonify_encodes_plain_results() {
        let mut result = ResultMap::new();
        result.insert("x".into(), ResultValue::vector(vec![0.0, 1.5]));
        result.insert("iterations".into(), ResultValue::Int64(12));
        result.insert("success".into(), ResultValue::Bool(true));
        result.insert("message".into(), ResultValue::from("done"));

        let text = jsonify(&result);
        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            decoded,
            json!({"x": [0.0, 1.5], "iterations": 12, "success": true, "message": "done"})
        );
    }

    #[test]
    fn jsonify_falls_back_on_string_form() {
        let mut result = ResultMap::new();
        result.insert("fun".into(), ResultValue::Callable("objective".into()));
        result.insert("fval".into(), ResultValue::Float64(1.0));

        let text = jsonify(&result);
        assert_eq!(text, r#"{"fun": <callable objective>, "fval": 1.0}"#);
        assert!(serde_json::from_str::<Value>(&text).is_err());
    }
}
