use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::model::{
    RemainingRequestsRequest, RemainingRequestsResponse, StressTestRequest, StressTestResponse,
    outcome_code,
};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::ClientIp;
use crate::utils::{
    error_codes, error_to_api_response, outcome_to_api_response, success_to_api_response,
};

#[axum::debug_handler]
pub async fn run_stress_test(
    State(state): State<AppState>,
    ClientIp(remote_ip): ClientIp,
    Json(req): Json<StressTestRequest>,
) -> impl IntoResponse {
    if req.strategy.trim().is_empty() {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "策略内容不能为空".to_string()),
        );
    }

    // 请求体中的标识优先，其次是连接推断的 IP
    let identifier = req.client_ip.clone().or(remote_ip);
    let outcome = state
        .gateway()
        .submit(identifier.as_deref(), &req.analysis_request())
        .await;

    let (code, msg) = outcome_code(&outcome);
    (
        StatusCode::OK,
        outcome_to_api_response(code, msg, StressTestResponse::from(outcome)),
    )
}

#[axum::debug_handler]
pub async fn remaining_requests(
    State(state): State<AppState>,
    ClientIp(remote_ip): ClientIp,
    Json(req): Json<RemainingRequestsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let identifier = req.client_ip.or(remote_ip);
    let summary = state.gateway().usage(identifier.as_deref()).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(RemainingRequestsResponse::from(summary)),
    ))
}
