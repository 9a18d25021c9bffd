pub mod error;
pub mod parser;
pub mod rules;
pub mod types;

pub use error::XmlError;
pub use parser::*;
pub use types::*;
