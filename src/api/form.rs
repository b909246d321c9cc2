use axum::extract::Multipart;
use crate::errors::XaiError;
use crate::models::PatientMetadata;
use crate::pipeline::ImageUpload;

pub const NO_FILE_PART: &str = "No file part";

/// The fields `/predict` and `/explain` read from a multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<ImageUpload>,
    pub patient: PatientMetadata,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, XaiError> {
        let mut form = UploadForm::default();
        let mut snake_id: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(malformed)?;
                    form.file = Some(ImageUpload { filename, bytes: bytes.to_vec() });
                }
                "patientName" => form.patient.name = field.text().await.map_err(malformed)?,
                "patientId" => form.patient.id = field.text().await.map_err(malformed)?,
                "patient_id" => snake_id = Some(field.text().await.map_err(malformed)?),
                "patientAge" => form.patient.age = field.text().await.map_err(malformed)?,
                "patientGender" => form.patient.gender = field.text().await.map_err(malformed)?,
                _ => {}
            }
        }

        if form.patient.id.trim().is_empty() {
            if let Some(id) = snake_id {
                form.patient.id = id;
            }
        }
        form.patient.id = form.patient.id.trim().to_string();
        Ok(form)
    }

    /// The uploaded image, or the 400 a missing `file` field maps to.
    pub fn take_file(&mut self) -> Result<ImageUpload, XaiError> {
        self.file.take().ok_or_else(|| XaiError::validation(NO_FILE_PART))
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> XaiError {
    XaiError::validation(format!("Malformed multipart body: {}", e.body_text()))
}
