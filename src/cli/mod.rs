pub mod commands;
pub mod history;
pub mod serve;
pub mod validate;

pub use commands::{Cli, Commands};
