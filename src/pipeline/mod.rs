pub mod orchestrator;
pub mod state;

pub use orchestrator::{
    ExplainOutcome, ExplainRequest, ImageUpload, Orchestrator, PredictOutcome, PredictRequest,
    MISSING_PATIENT_ID, NO_FILE_SELECTED,
};
pub use state::{ExplanationStage, PredictionStage, StageTracker};
