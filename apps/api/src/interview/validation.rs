use bytes::Bytes;

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// A résumé as received at the boundary, before any checks.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Accepts only non-empty PDF files: `.pdf` name and `%PDF-` signature.
pub fn validate_document(doc: &UploadedDocument) -> Result<(), AppError> {
    let file_name = doc
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("No résumé file was uploaded".to_string()))?;

    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation(
            "Only PDF files can be uploaded".to_string(),
        ));
    }

    if doc.bytes.is_empty() {
        return Err(AppError::Validation(
            "An empty file cannot be uploaded".to_string(),
        ));
    }

    if !doc.bytes.starts_with(PDF_SIGNATURE) {
        return Err(AppError::Validation(
            "The uploaded file is not a valid PDF".to_string(),
        ));
    }

    Ok(())
}

/// Trims `value` and rejects it when blank.
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
