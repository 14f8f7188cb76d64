use axum::{extract::Json, http::StatusCode, response::IntoResponse};

use super::model::{
    ExportTranscriptRequest, ExportTranscriptResponse, ImportTranscriptRequest,
    ImportTranscriptResponse,
};
use crate::analysis::transcript::{export_markdown, parse_markdown};
use crate::utils::success_to_api_response;

pub async fn export_transcript(Json(req): Json<ExportTranscriptRequest>) -> impl IntoResponse {
    let file_name = format!(
        "lexpath_chat_{}.md",
        chrono::Utc::now().timestamp_millis()
    );
    (
        StatusCode::OK,
        success_to_api_response(ExportTranscriptResponse {
            file_name,
            markdown: export_markdown(&req.messages),
        }),
    )
}

pub async fn import_transcript(Json(req): Json<ImportTranscriptRequest>) -> impl IntoResponse {
    let entries = parse_markdown(&req.markdown);
    tracing::debug!("imported {} transcript entries", entries.len());
    (
        StatusCode::OK,
        success_to_api_response(ImportTranscriptResponse { entries }),
    )
}
