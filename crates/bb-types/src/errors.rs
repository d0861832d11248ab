use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Optimizer error: {0}")]
    Optimizer(#[from] OptimizerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding the JSON configuration argument
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid option {option}: {message}")]
    InvalidOption { option: String, message: String },
}

/// Errors in the stdin/stdout evaluation exchange
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Reply {line:?} to evaluation request {request} is not a number")]
    InvalidReply { request: u64, line: String },

    #[error("Input closed while waiting for the reply to evaluation request {request}")]
    InputClosed { request: u64 },

    #[error("Evaluator refused request after an earlier protocol failure")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the optimizer itself
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Empty starting point: x0 needs at least one coordinate")]
    EmptyProblem,

    #[error("Dimension mismatch: {name} has {actual} entries, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid bounds at coordinate {index}: {reason}")]
    InvalidBounds { index: usize, reason: String },

    #[error("All coordinates are fixed, nothing to optimize")]
    NoFreeVariables,

    #[error("Objective returned {value} at {point:?}")]
    NonFiniteObjective { value: f64, point: Vec<f64> },
}

/// Errors converting result values to JSON
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Value of kind {kind} at {path} has no JSON form")]
    Unsupported { kind: &'static str, path: String },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Macro for creating invalid-bounds errors
#[macro_export]
macro_rules! invalid_bounds {
    ($index:expr, $($arg:tt)*) => {
        $crate::OptimizerError::InvalidBounds {
            index: $index,
            reason: format!($($arg)*),
        }
    };
}

/// Macro for creating invalid-option errors
#[macro_export]
macro_rules! option_error {
    ($option:expr, $($arg:tt)*) => {
        $crate::ConfigError::InvalidOption {
            option: $option.to_string(),
            message: format!($($arg)*),
        }
    };
}
