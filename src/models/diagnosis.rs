use serde::{Deserialize, Serialize};
use crate::errors::XaiError;

/// Probabilities strictly above this map to [`Diagnosis::Pneumonia`].
pub const DECISION_THRESHOLD: f64 = 0.5;

/// The two classes of the binary X-ray classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    #[serde(alias = "NORMAL")]
    Normal,
    #[serde(alias = "PNEUMONIA")]
    Pneumonia,
}

impl Diagnosis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diagnosis::Normal => "Normal",
            Diagnosis::Pneumonia => "Pneumonia",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A thresholded classifier output: the winning label and its confidence
/// as a percentage in [0, 100], rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub label: Diagnosis,
    pub confidence: f64,
}

impl DiagnosisResult {
    pub fn from_probability(probability: f64) -> Result<Self, XaiError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(XaiError::InvalidOutput(format!(
                "probability {} is outside [0, 1]",
                probability
            )));
        }

        let (label, confidence) = if probability > DECISION_THRESHOLD {
            (Diagnosis::Pneumonia, probability)
        } else {
            (Diagnosis::Normal, 1.0 - probability)
        };

        Ok(Self {
            label,
            confidence: round_percentage(confidence * 100.0),
        })
    }
}

/// Round to two decimal places and clamp into [0, 100].
pub fn round_percentage(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above_threshold_is_pneumonia() {
        let result = DiagnosisResult::from_probability(0.87654).unwrap();
        assert_eq!(result.label, Diagnosis::Pneumonia);
        assert_eq!(result.confidence, 87.65);
    }

    #[test]
    fn test_threshold_itself_is_normal() {
        let result = DiagnosisResult::from_probability(0.5).unwrap();
        assert_eq!(result.label, Diagnosis::Normal);
        assert_eq!(result.confidence, 50.0);
    }

    #[test]
    fn test_low_probability_reports_inverse_confidence() {
        let result = DiagnosisResult::from_probability(0.0321).unwrap();
        assert_eq!(result.label, Diagnosis::Normal);
        assert_eq!(result.confidence, 96.79);
    }

    #[test]
    fn test_confidence_always_in_percentage_range() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let result = DiagnosisResult::from_probability(p).unwrap();
            assert!((50.0..=100.0).contains(&result.confidence), "p={p} gave {}", result.confidence);
        }
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        assert!(DiagnosisResult::from_probability(1.2).is_err());
        assert!(DiagnosisResult::from_probability(-0.1).is_err());
        assert!(DiagnosisResult::from_probability(f64::NAN).is_err());
    }

    #[test]
    fn test_uppercase_labels_deserialize() {
        let parsed: Diagnosis = serde_json::from_str("\"PNEUMONIA\"").unwrap();
        assert_eq!(parsed, Diagnosis::Pneumonia);
        assert_eq!(serde_json::to_string(&Diagnosis::Normal).unwrap(), "\"Normal\"");
    }
}
