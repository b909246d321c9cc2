use serde::{Deserialize, Serialize};
use crate::models::{Diagnosis, PatientMetadata};

/// Patient block echoed back by `/predict`.
#[derive(Debug, Serialize)]
pub struct PatientInfo {
    pub name: String,
    pub id: String,
    pub age: String,
    pub gender: String,
}

impl From<PatientMetadata> for PatientInfo {
    fn from(patient: PatientMetadata) -> Self {
        Self {
            name: patient.name,
            id: patient.id,
            age: patient.age,
            gender: patient.gender,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub label: Diagnosis,
    pub confidence: f64,
    pub patient_info: PatientInfo,
    pub report_id: Option<String>,
}

/// `/explain` reply. Overlay fields are absolute URLs under `/static`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    pub label: Option<Diagnosis>,
    pub confidence: Option<f64>,
    pub gradcam: String,
    pub lime: String,
    pub occlusion: String,
    pub report_id: Option<String>,
}

/// Accepts both `patientId` and `patient_id`; an empty value means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "patientId")]
    pub patient_id_camel: Option<String>,
    pub patient_id: Option<String>,
}

impl HistoryQuery {
    pub fn patient_filter(&self) -> Option<&str> {
        self.patient_id_camel
            .as_deref()
            .or(self.patient_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query_prefers_camel_case() {
        let q = HistoryQuery { patient_id_camel: Some("A".into()), patient_id: Some("B".into()) };
        assert_eq!(q.patient_filter(), Some("A"));

        let q = HistoryQuery { patient_id_camel: None, patient_id: Some("B".into()) };
        assert_eq!(q.patient_filter(), Some("B"));
    }

    #[test]
    fn test_blank_history_filter_is_none() {
        let q = HistoryQuery { patient_id_camel: Some("  ".into()), patient_id: None };
        assert_eq!(q.patient_filter(), None);
        assert_eq!(HistoryQuery::default().patient_filter(), None);
    }
}
