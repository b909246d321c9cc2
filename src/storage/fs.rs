use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::errors::XaiError;
use crate::models::Report;
use crate::utils::fs::atomic_write;
use super::ReportStore;

/// Flat directory of `<reportId>.json` files.
#[derive(Debug, Clone)]
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, XaiError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            XaiError::Persistence(format!("Failed to create reports dir {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, report_id: &str) -> Result<PathBuf, XaiError> {
        if report_id.is_empty() || report_id.contains(['/', '\\', '.', '\0']) {
            return Err(XaiError::Persistence(format!("Invalid report id '{}'", report_id)));
        }
        Ok(self.dir.join(format!("{}.json", report_id)))
    }

    async fn write_record(&self, path: &Path, report: &Report) -> Result<(), XaiError> {
        let body = serde_json::to_vec_pretty(report)?;
        atomic_write(path, &body).await.map_err(|e| {
            XaiError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    async fn read_record(path: &Path) -> Result<Report, XaiError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| XaiError::MalformedRecord {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| XaiError::MalformedRecord {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, XaiError> {
        let pattern = format!(
            "{}/*.json",
            glob::Pattern::escape(&self.dir.to_string_lossy())
        );
        let entries = glob::glob(&pattern)
            .map_err(|e| XaiError::Internal(format!("Bad glob pattern '{}': {}", pattern, e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable report entry");
                    None
                }
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl ReportStore for FsReportStore {
    async fn create(&self, report: &Report) -> Result<(), XaiError> {
        let path = self.record_path(&report.report_id)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(XaiError::Persistence(format!(
                "Report {} already exists",
                report.report_id
            )));
        }
        self.write_record(&path, report).await?;
        debug!(report_id = %report.report_id, "Report created");
        Ok(())
    }

    async fn get(&self, report_id: &str) -> Result<Option<Report>, XaiError> {
        let path = self.record_path(report_id)?;
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Self::read_record(&path).await.map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(XaiError::Persistence(format!("Failed to stat {}: {}", path.display(), e))),
        }
    }

    async fn put(&self, report: &Report) -> Result<(), XaiError> {
        let path = self.record_path(&report.report_id)?;
        self.write_record(&path, report).await?;
        debug!(report_id = %report.report_id, "Report updated");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Report>, XaiError> {
        let mut reports = Vec::new();
        for path in self.record_paths()? {
            match Self::read_record(&path).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "Skipping malformed report"),
            }
        }
        Ok(reports)
    }

    fn backend_name(&self) -> &str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientMetadata, Prediction, XaiArtifacts};
    use tempfile::TempDir;

    fn report(id: &str, patient: &str) -> Report {
        Report {
            report_id: id.to_string(),
            patient: PatientMetadata { id: patient.to_string(), ..Default::default() },
            image_filename: format!("{}_scan.png", id),
            created_at: "2024-05-01T10:00:00.000000Z".to_string(),
            updated_at: "2024-05-01T10:00:00.000000Z".to_string(),
            prediction: Prediction::default(),
            xai: XaiArtifacts::default(),
        }
    }

    fn store() -> (TempDir, FsReportStore) {
        let dir = TempDir::new().unwrap();
        let store = FsReportStore::new(dir.path().join("reports")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, store) = store();
        store.create(&report("a1", "P1")).await.unwrap();

        let loaded = store.get("a1").await.unwrap().unwrap();
        assert_eq!(loaded, report("a1", "P1"));
        assert!(store.dir().join("a1.json").exists());
    }

    #[tokio::test]
    async fn test_create_refuses_existing_id() {
        let (_dir, store) = store();
        store.create(&report("a1", "P1")).await.unwrap();
        let err = store.create(&report("a1", "P2")).await.unwrap_err();
        assert!(matches!(err, XaiError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_rejects_path_like_ids() {
        let (_dir, store) = store();
        assert!(store.get("../secret").await.is_err());
    }

    #[tokio::test]
    async fn test_get_corrupt_record_is_malformed() {
        let (_dir, store) = store();
        std::fs::write(store.dir().join("bad.json"), "{not json").unwrap();
        let err = store.get("bad").await.unwrap_err();
        assert!(matches!(err, XaiError::MalformedRecord { .. }));
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_and_foreign_files() {
        let (_dir, store) = store();
        store.create(&report("a1", "P1")).await.unwrap();
        store.create(&report("c3", "P2")).await.unwrap();
        std::fs::write(store.dir().join("b2.json"), "{\"reportId\": ").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let reports = store.list().await.unwrap();
        let ids: Vec<&str> = reports.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "c3"]);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, store) = store();
        let mut r = report("a1", "P1");
        store.create(&r).await.unwrap();
        r.patient.name = "Jane".to_string();
        store.put(&r).await.unwrap();
        assert_eq!(store.get("a1").await.unwrap().unwrap().patient.name, "Jane");
    }
}
