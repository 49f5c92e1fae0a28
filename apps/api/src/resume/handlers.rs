use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::resume::document::{extract_text, DocumentKind, MAX_DOCX_EXPANSION};
use crate::resume::extractor::{extract_fields, ParsedResume};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ParseResumeResponse {
    pub ok: bool,
    pub data: ParsedResume,
}

#[derive(Debug, Serialize)]
pub struct ParseUsageResponse {
    pub ok: bool,
    pub message: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

/// POST /api/resume/parse
///
/// Accepts a PDF or DOCX in the multipart field `file` and returns the fields
/// guessed from its text.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let max_bytes = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {max_bytes} byte limit"
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let kind = DocumentKind::detect(file_name.as_deref(), content_type.as_deref(), &bytes)?;
        let size = bytes.len();
        let max_xml_bytes = (max_bytes as u64).saturating_mul(MAX_DOCX_EXPANSION);
        let text = extract_text(kind, bytes, max_xml_bytes).await?;
        let data = extract_fields(&text);

        info!(
            "Parsed {kind:?} resume ({size} bytes, {} skills found)",
            data.skills.len()
        );
        return Ok(Json(ParseResumeResponse { ok: true, data }));
    }

    Err(AppError::Validation(format!(
        "No file uploaded. Send the resume in the multipart field '{UPLOAD_FIELD}'."
    )))
}

/// GET /api/resume/parse
pub async fn handle_parse_usage() -> Json<ParseUsageResponse> {
    Json(ParseUsageResponse {
        ok: true,
        message: format!(
            "POST a PDF or DOCX resume as multipart/form-data in the field '{UPLOAD_FIELD}'."
        ),
    })
}
