use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::model::ResetUsageResponse;
use crate::AppState;
use crate::error::AppError;
use crate::utils::success_to_api_response;

/// 清空用量账本
#[axum::debug_handler]
pub async fn reset_usage(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let deleted = state.gateway().reset_usage().await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(ResetUsageResponse { deleted }),
    ))
}
