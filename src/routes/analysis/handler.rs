use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::model::{DirectAnalysisRequest, PersonaInfo};
use crate::AppState;
use crate::analysis::{Persona, analyze_with_credentials};
use crate::error::AppError;
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn run_direct_analysis(
    State(state): State<AppState>,
    Json(req): Json<DirectAnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.strategy.trim().is_empty() {
        return Err(AppError::Validation("策略内容不能为空".to_string()));
    }

    let request = req.analysis_request();
    let credentials = req
        .credentials
        .normalized(state.config.qwen_api_key.as_deref());
    tracing::info!(
        "direct analysis as {} with {:?}",
        request.persona,
        credentials
    );

    let result = analyze_with_credentials(state.providers.as_ref(), &credentials, &request).await;
    if let Some(severity) = result.severity() {
        tracing::info!("final verdict rated {}", severity.label());
    }

    Ok((StatusCode::OK, success_to_api_response(result)))
}

/// 角色列表，供前端渲染选择器
pub async fn list_personas() -> impl IntoResponse {
    let personas: Vec<PersonaInfo> = Persona::ALL
        .into_iter()
        .map(|p| PersonaInfo {
            persona: p.as_str(),
            title: p.title(),
        })
        .collect();
    (StatusCode::OK, success_to_api_response(personas))
}
