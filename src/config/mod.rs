pub mod parser;
pub mod schema;
pub mod types;
pub mod security;

pub use types::*;
pub use parser::{load_settings, parse_config, validate_settings};
