use bb_bridge::{jsonify, render_result};
use bb_types::{ResultMap, ResultValue};
use proptest::prelude::*;
use serde_json::Value;

fn plain_value() -> impl Strategy<Value = ResultValue> {
    let leaf = prop_oneof![
        Just(ResultValue::Null),
        any::<bool>().prop_map(ResultValue::Bool),
        any::<i64>().prop_map(ResultValue::Int64),
        (-1e12f64..1e12).prop_map(ResultValue::Float64),
        "[a-z ]{0,8}".prop_map(ResultValue::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ResultValue::List),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(ResultValue::Map),
        ]
    })
}

fn plain_map() -> impl Strategy<Value = ResultMap> {
    prop::collection::btree_map("[a-z_]{1,8}", plain_value(), 0..6)
}

/// Rebuild a result value from decoded JSON. Integers decode as `Int64`,
/// every other number as `Float64`.
fn decode(value: &Value) -> ResultValue {
    match value {
        Value::Null => ResultValue::Null,
        Value::Bool(v) => ResultValue::Bool(*v),
        Value::Number(n) => match n.as_i64() {
            Some(v) => ResultValue::Int64(v),
            None => ResultValue::Float64(n.as_f64().unwrap()),
        },
        Value::String(s) => ResultValue::Str(s.clone()),
        Value::Array(items) => ResultValue::List(items.iter().map(decode).collect()),
        Value::Object(map) => ResultValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), decode(v)))
                .collect(),
        ),
    }
}

proptest! {
    #[test]
    fn plain_results_decode_to_the_same_values(result in plain_map()) {
        let text = jsonify(&result);
        let decoded: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(decode(&decoded), ResultValue::Map(result));
    }

    #[test]
    fn float_arrays_keep_every_element(values in prop::collection::vec(-1e6f64..1e6, 0..16)) {
        let mut result = ResultMap::new();
        result.insert("x".into(), ResultValue::vector(values.clone()));
        let decoded: Value = serde_json::from_str(&jsonify(&result)).unwrap();

        let items = decoded["x"].as_array().unwrap();
        prop_assert_eq!(items.len(), values.len());
        for (item, expected) in items.iter().zip(&values) {
            prop_assert_eq!(item.as_f64().unwrap(), *expected);
        }
    }

    #[test]
    fn result_line_never_contains_fun(result in plain_map()) {
        let mut result = result;
        result.remove("fun");
        let mut with_fun = result.clone();
        with_fun.insert("fun".into(), ResultValue::Callable("objective".into()));
        let text = render_result(with_fun);

        let decoded: Value = serde_json::from_str(&text).unwrap();
        prop_assert!(decoded.get("fun").is_none());
        prop_assert_eq!(text, jsonify(&result));
    }
}
