use serde::{Deserialize, Serialize};
use super::diagnosis::Diagnosis;

/// Free-form patient metadata supplied with an upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientMetadata {
    #[serde(rename = "patientName", default)]
    pub name: String,
    #[serde(rename = "patientId", default)]
    pub id: String,
    #[serde(rename = "patientAge", default)]
    pub age: String,
    #[serde(rename = "patientGender", default)]
    pub gender: String,
}

/// Classifier output attached to a report. Serializes as `{}` while unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Diagnosis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_at: Option<String>,
}

impl Prediction {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.confidence.is_none()
    }
}

/// References to the three explanation overlays, relative to the static
/// root (`explanations/<patientId>/gradcam.png`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XaiArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradcam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl XaiArtifacts {
    pub fn is_empty(&self) -> bool {
        self.gradcam.is_none() && self.lime.is_none() && self.occlusion.is_none()
    }
}

/// One diagnostic session, persisted as `<reportId>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: String,
    #[serde(flatten)]
    pub patient: PatientMetadata,
    #[serde(default)]
    pub image_filename: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub prediction: Prediction,
    #[serde(default)]
    pub xai: XaiArtifacts,
}

impl Report {
    /// Recency key: `updatedAt`, falling back to `createdAt`, then `""`.
    /// Timestamps are fixed-width ISO-8601 so string order is time order.
    pub fn sort_key(&self) -> &str {
        if !self.updated_at.is_empty() {
            &self.updated_at
        } else {
            &self.created_at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(created: &str, updated: &str) -> Report {
        Report {
            report_id: "r1".into(),
            patient: PatientMetadata::default(),
            image_filename: String::new(),
            created_at: created.into(),
            updated_at: updated.into(),
            prediction: Prediction::default(),
            xai: XaiArtifacts::default(),
        }
    }

    #[test]
    fn test_sort_key_fallbacks() {
        assert_eq!(report("2024-01-01", "2024-02-01").sort_key(), "2024-02-01");
        assert_eq!(report("2024-01-01", "").sort_key(), "2024-01-01");
        assert_eq!(report("", "").sort_key(), "");
    }

    #[test]
    fn test_empty_subrecords_serialize_as_empty_objects() {
        let value = serde_json::to_value(report("a", "b")).unwrap();
        assert_eq!(value["prediction"], json!({}));
        assert_eq!(value["xai"], json!({}));
        assert_eq!(value["patientId"], "");
        assert_eq!(value["reportId"], "r1");
    }

    #[test]
    fn test_sparse_legacy_record_parses() {
        let parsed: Report = serde_json::from_value(json!({
            "reportId": "legacy",
            "patientId": "P-7",
            "prediction": { "label": "PNEUMONIA", "confidence": 91.2 },
            "someOtherField": true
        }))
        .unwrap();
        assert_eq!(parsed.patient.id, "P-7");
        assert_eq!(parsed.prediction.label, Some(Diagnosis::Pneumonia));
        assert!(parsed.xai.is_empty());
        assert_eq!(parsed.sort_key(), "");
    }
}
