pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{Column, Schema};
pub use value::{DataType, Value};
