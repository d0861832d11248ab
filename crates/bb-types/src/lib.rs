pub mod config;
pub mod errors;
pub mod value;

pub use config::*;
pub use errors::*;
pub use value::*;
