pub mod history;
pub mod service;

pub use history::{sort_latest_first, History, HistoryEntry};
pub use service::ReportService;
