pub mod fs;
pub mod layout;
pub mod uploads;

use async_trait::async_trait;
use crate::errors::XaiError;
use crate::models::Report;

pub use fs::FsReportStore;
pub use layout::{ArtifactKind, StaticLayout};
pub use uploads::{SavedUpload, UploadStore};

/// Key-value persistence for reports, keyed by `reportId`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a new record. Fails if the id is already taken.
    async fn create(&self, report: &Report) -> Result<(), XaiError>;

    /// Load a record. `Ok(None)` when no record has this id.
    async fn get(&self, report_id: &str) -> Result<Option<Report>, XaiError>;

    /// Overwrite an existing record.
    async fn put(&self, report: &Report) -> Result<(), XaiError>;

    /// Every readable record, in a stable backend-defined order.
    /// Unreadable records are skipped and logged, never fatal.
    async fn list(&self) -> Result<Vec<Report>, XaiError>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}
