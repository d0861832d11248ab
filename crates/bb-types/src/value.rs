//! Values carried in an optimizer result.
//!
//! The optimizer reports a loosely-typed mapping whose entries mix n-dimensional
//! float arrays, 64-bit scalars, flags, strings, nested containers and opaque
//! handles such as the objective itself. [`ResultValue`] names each of those
//! shapes so consumers can convert them with an exhaustive `match`.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, ArrayD, ArrayViewD, Axis};

/// Optimizer result, keyed by field name.
pub type ResultMap = BTreeMap<String, ResultValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Str(String),
    /// Dense float array of any rank.
    Array(ArrayD<f64>),
    List(Vec<ResultValue>),
    Map(ResultMap),
    /// Opaque handle to a function; carries only its name.
    Callable(String),
}

impl ResultValue {
    /// One-dimensional float array.
    pub fn vector(values: Vec<f64>) -> Self {
        Self::Array(Array1::from(values).into_dyn())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int64(_) => "int64",
            Self::Float64(_) => "float64",
            Self::Str(_) => "str",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Callable(_) => "callable",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            Self::Int64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Array elements in logical (row-major) order.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_array().map(|a| a.iter().copied().collect())
    }
}

impl From<bool> for ResultValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ResultValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for ResultValue {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for ResultValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<f64>> for ResultValue {
    fn from(v: Vec<f64>) -> Self {
        Self::vector(v)
    }
}

impl From<ArrayD<f64>> for ResultValue {
    fn from(v: ArrayD<f64>) -> Self {
        Self::Array(v)
    }
}

impl From<ResultMap> for ResultValue {
    fn from(v: ResultMap) -> Self {
        Self::Map(v)
    }
}

// Single-line rendering; used as the last-resort textual form of a result.
impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v:?}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::Array(v) => {
                f.write_str("array(")?;
                write_array(f, v.view())?;
                f.write_str(")")
            }
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => write_map(f, map),
            Self::Callable(name) => write!(f, "<callable {name}>"),
        }
    }
}

fn write_array(f: &mut fmt::Formatter<'_>, view: ArrayViewD<'_, f64>) -> fmt::Result {
    if view.ndim() == 0 {
        return match view.iter().next() {
            Some(v) => write!(f, "{v:?}"),
            None => f.write_str("[]"),
        };
    }
    f.write_str("[")?;
    for (i, sub) in view.axis_iter(Axis(0)).enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_array(f, sub)?;
    }
    f.write_str("]")
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &ResultMap) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key:?}: {value}")?;
    }
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn vector_is_one_dimensional() {
        let v = ResultValue::vector(vec![1.0, 2.0, 3.0]);
        let array = v.as_array().unwrap();
        assert_eq!(array.shape(), &[3]);
        assert_eq!(v.kind(), "array");
        assert_eq!(v.to_f64_vec(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(ResultValue::Int64(4).as_f64(), Some(4.0));
        assert_eq!(ResultValue::Float64(0.5).as_i64(), None);
        assert_eq!(ResultValue::from(true).as_bool(), Some(true));
        assert_eq!(ResultValue::from("done").as_str(), Some("done"));
        assert!(ResultValue::Null.as_array().is_none());
    }

    #[test]
    fn display_stays_on_one_line() {
        let mut map = ResultMap::new();
        map.insert("fun".into(), ResultValue::Callable("objective".into()));
        map.insert("grid".into(), arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn().into());
        map.insert("message".into(), ResultValue::from("line one\nline two"));
        map.insert("seed".into(), ResultValue::Int64(7));
        map.insert("x".into(), ResultValue::vector(vec![0.25]));

        let text = ResultValue::Map(map).to_string();
        assert!(!text.contains('\n'));
        assert_eq!(
            text,
            r#"{"fun": <callable objective>, "grid": array([[1.0, 2.0], [3.0, 4.0]]), "message": "line one\nline two", "seed": 7, "x": array([0.25])}"#
        );
    }

    #[test]
    fn display_nested_list() {
        let value = ResultValue::List(vec![
            ResultValue::Null,
            ResultValue::Bool(false),
            ResultValue::List(vec![ResultValue::Float64(1.5)]),
        ]);
        assert_eq!(value.to_string(), "[null, false, [1.5]]");
    }
}
