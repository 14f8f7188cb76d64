use serde::{Deserialize, Serialize};

use crate::analysis::transcript::{ChatMessage, TranscriptEntry};

#[derive(Debug, Deserialize)]
pub struct ExportTranscriptRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTranscriptResponse {
    pub file_name: String,
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportTranscriptRequest {
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct ImportTranscriptResponse {
    pub entries: Vec<TranscriptEntry>,
}
