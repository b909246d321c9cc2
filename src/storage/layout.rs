use std::path::{Path, PathBuf};
use crate::models::XaiArtifacts;
use crate::utils::filename::validate_path_segment;

pub const UPLOADS_SUBDIR: &str = "uploads";
pub const EXPLANATIONS_SUBDIR: &str = "explanations";
/// URL prefix the static root is served under.
pub const STATIC_ROUTE: &str = "/static";

/// The three overlays produced per explanation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    GradCam,
    Lime,
    Occlusion,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::GradCam, ArtifactKind::Lime, ArtifactKind::Occlusion];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::GradCam => "gradcam.png",
            ArtifactKind::Lime => "lime.png",
            ArtifactKind::Occlusion => "occlusion.png",
        }
    }

    fn slot<'a>(&self, artifacts: &'a mut XaiArtifacts) -> &'a mut Option<String> {
        match self {
            ArtifactKind::GradCam => &mut artifacts.gradcam,
            ArtifactKind::Lime => &mut artifacts.lime,
            ArtifactKind::Occlusion => &mut artifacts.occlusion,
        }
    }
}

/// Directory layout of the static root and the public URLs it is served at.
///
/// ```text
/// <root>/uploads/<uuid>_<name>
/// <root>/explanations/<patientId>/{gradcam,lime,occlusion}.png
/// ```
#[derive(Debug, Clone)]
pub struct StaticLayout {
    root: PathBuf,
    public_url: String,
}

impl StaticLayout {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_SUBDIR)
    }

    pub fn explanations_dir(&self) -> PathBuf {
        self.root.join(EXPLANATIONS_SUBDIR)
    }

    /// Callers validate `patient_id` as a path segment first.
    pub fn patient_dir(&self, patient_id: &str) -> PathBuf {
        self.explanations_dir().join(patient_id)
    }

    pub fn artifact_path(&self, patient_id: &str, kind: ArtifactKind) -> PathBuf {
        self.patient_dir(patient_id).join(kind.file_name())
    }

    /// Static-relative reference stored in report records.
    pub fn artifact_ref(patient_id: &str, kind: ArtifactKind) -> String {
        format!("{}/{}/{}", EXPLANATIONS_SUBDIR, patient_id, kind.file_name())
    }

    pub fn upload_ref(filename: &str) -> String {
        format!("{}/{}", UPLOADS_SUBDIR, filename)
    }

    /// Absolute URL for a static-relative reference. References that are
    /// already absolute URLs pass through unchanged.
    pub fn public_url_for(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        let fallback = format!(
            "{}{}/{}",
            self.public_url,
            STATIC_ROUTE,
            reference.trim_start_matches('/')
        );
        let Ok(mut url) = reqwest::Url::parse(&self.public_url) else {
            return fallback;
        };
        // Each segment is pushed separately so `#`, `?` and `%` in patient
        // ids are percent-encoded instead of starting a query or fragment.
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments
                    .pop_if_empty()
                    .push(STATIC_ROUTE.trim_start_matches('/'))
                    .extend(reference.trim_start_matches('/').split('/'));
            }
            Err(()) => return fallback,
        }
        url.to_string()
    }

    /// Fill empty artifact slots from conventional files on disk. Never
    /// replaces a stored reference; `generatedAt` is left as stored.
    pub async fn infer_artifacts(&self, patient_id: &str, stored: &XaiArtifacts) -> XaiArtifacts {
        let mut merged = stored.clone();
        if validate_path_segment(patient_id).is_err() {
            return merged;
        }

        for kind in ArtifactKind::ALL {
            let slot = kind.slot(&mut merged);
            if slot.is_some() {
                continue;
            }
            let path = self.artifact_path(patient_id, kind);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                *slot = Some(Self::artifact_ref(patient_id, kind));
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_refs_and_urls() {
        let layout = StaticLayout::new("/srv/static", "http://localhost:5000/");
        let reference = StaticLayout::artifact_ref("P1", ArtifactKind::Lime);
        assert_eq!(reference, "explanations/P1/lime.png");
        assert_eq!(
            layout.public_url_for(&reference),
            "http://localhost:5000/static/explanations/P1/lime.png"
        );
        assert_eq!(
            layout.artifact_path("P1", ArtifactKind::Occlusion),
            PathBuf::from("/srv/static/explanations/P1/occlusion.png")
        );
    }

    #[test]
    fn test_public_url_encodes_spaces_and_keeps_absolute() {
        let layout = StaticLayout::new("/srv/static", "http://localhost:5000");
        assert_eq!(
            layout.public_url_for("explanations/john doe/gradcam.png"),
            "http://localhost:5000/static/explanations/john%20doe/gradcam.png"
        );
        assert_eq!(
            layout.public_url_for("https://cdn.example.org/a.png"),
            "https://cdn.example.org/a.png"
        );

        let url = layout.public_url_for(&StaticLayout::artifact_ref("MRN#12?v=1", ArtifactKind::GradCam));
        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/static/explanations/MRN%2312%3Fv=1/gradcam.png");
        assert_eq!(parsed.fragment(), None);
        assert_eq!(parsed.query(), None);
    }

    #[test]
    fn test_public_url_keeps_base_path() {
        let layout = StaticLayout::new("/srv/static", "https://xray.example.org/app");
        assert_eq!(
            layout.public_url_for("uploads/abc_scan.png"),
            "https://xray.example.org/app/static/uploads/abc_scan.png"
        );
    }

    #[tokio::test]
    async fn test_inference_fills_only_missing_slots() {
        let dir = TempDir::new().unwrap();
        let layout = StaticLayout::new(dir.path(), "http://localhost:5000");
        let patient_dir = layout.patient_dir("P9");
        std::fs::create_dir_all(&patient_dir).unwrap();
        std::fs::write(patient_dir.join("gradcam.png"), b"png").unwrap();
        std::fs::write(patient_dir.join("lime.png"), b"png").unwrap();

        let stored = XaiArtifacts {
            lime: Some("explanations/elsewhere/lime.png".into()),
            ..Default::default()
        };
        let merged = layout.infer_artifacts("P9", &stored).await;

        assert_eq!(merged.gradcam.as_deref(), Some("explanations/P9/gradcam.png"));
        assert_eq!(merged.lime.as_deref(), Some("explanations/elsewhere/lime.png"));
        assert_eq!(merged.occlusion, None);
    }

    #[tokio::test]
    async fn test_inference_ignores_unsafe_patient_ids() {
        let dir = TempDir::new().unwrap();
        let layout = StaticLayout::new(dir.path(), "http://localhost:5000");
        let merged = layout.infer_artifacts("..", &XaiArtifacts::default()).await;
        assert!(merged.is_empty());
    }
}
