//! `POST /analyze` and `GET /result/:job_id`.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::analyze::Submission;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::error::AnalyzerError;
use crate::models::Job;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub message: &'static str,
    pub job_id: String,
}

/// `POST /analyze`: multipart fields `user_id`, `file`, optional `query`.
///
/// Awaits the whole job. 400 for a non-PDF name (no job created), 500 with
/// the recorded message when the pipeline fails.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut user_id: Option<String> = None;
    let mut query: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "user_id" => user_id = Some(field.text().await.map_err(form_error)?),
            "query" => query = Some(field.text().await.map_err(form_error)?),
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let user_id = user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Unprocessable("user_id".into()))?;
    let (file_name, content) = file.ok_or_else(|| ApiError::Unprocessable("file".into()))?;

    let job_id = ctx
        .analyzer
        .submit(Submission {
            user_id,
            file_name,
            query,
            content,
        })
        .await?;

    Ok(Json(AnalyzeResponse {
        message: "Analysis completed",
        job_id,
    }))
}

/// `GET /result/:job_id`: the job record, or 404.
pub async fn result(
    State(ctx): State<ApiContext>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    ctx.store()
        .get_job(&job_id)
        .await?
        .map(Json)
        .ok_or_else(|| AnalyzerError::JobNotFound { job_id }.into())
}

fn form_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed form data: {}", e.body_text()))
    }
}
