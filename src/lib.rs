pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod reports;
pub mod storage;
pub mod utils;
