use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisRequest, AnalysisResult, Persona};
use crate::gateway::{GatewayOutcome, UsageSummary};
use crate::utils::error_codes;

pub const LIMIT_EXCEEDED_MESSAGE: &str =
    "Free request limit exceeded. Please enter your own API key.";
pub const MISSING_KEY_ERROR: &str = "Server configuration error: Missing API key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressTestRequest {
    #[serde(default)]
    pub persona: String,
    pub strategy: String,
    #[serde(default)]
    pub evidence_base64: Option<String>,
    #[serde(default, alias = "clientIdentifier")]
    pub client_ip: Option<String>,
}

impl StressTestRequest {
    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            persona: Persona::resolve(&self.persona),
            strategy: self.strategy.clone(),
            evidence_base64: self.evidence_base64.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StressTestResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_exceeded: Option<bool>,
    pub remaining_requests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 信封中的错误码和消息
pub fn outcome_code(outcome: &GatewayOutcome) -> (i32, String) {
    match outcome {
        GatewayOutcome::Success { .. } => (error_codes::SUCCESS, "success".to_string()),
        GatewayOutcome::LimitExceeded => {
            (error_codes::RATE_LIMIT, LIMIT_EXCEEDED_MESSAGE.to_string())
        }
        GatewayOutcome::ConfigurationError { .. } => {
            (error_codes::CONFIG_ERROR, MISSING_KEY_ERROR.to_string())
        }
        GatewayOutcome::CallFailure { reason, .. } => {
            (error_codes::UPSTREAM_ERROR, reason.clone())
        }
    }
}

impl From<GatewayOutcome> for StressTestResponse {
    fn from(outcome: GatewayOutcome) -> Self {
        let remaining_requests = outcome.remaining_requests();
        let base = StressTestResponse {
            success: false,
            limit_exceeded: None,
            remaining_requests,
            result: None,
            error: None,
            message: None,
        };

        match outcome {
            GatewayOutcome::Success { result, .. } => StressTestResponse {
                success: true,
                result: Some(result),
                ..base
            },
            GatewayOutcome::LimitExceeded => StressTestResponse {
                limit_exceeded: Some(true),
                message: Some(LIMIT_EXCEEDED_MESSAGE.to_string()),
                ..base
            },
            GatewayOutcome::ConfigurationError { .. } => StressTestResponse {
                error: Some(MISSING_KEY_ERROR.to_string()),
                ..base
            },
            GatewayOutcome::CallFailure { reason, .. } => StressTestResponse {
                error: Some(reason),
                ..base
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingRequestsRequest {
    #[serde(default, alias = "clientIdentifier")]
    pub client_ip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemainingRequestsResponse {
    pub remaining_requests: u32,
    pub total_used: u32,
}

impl From<UsageSummary> for RemainingRequestsResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            remaining_requests: summary.remaining_requests,
            total_used: summary.total_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fallback;

    #[test]
    fn limit_exceeded_serializes_with_flag_and_message() {
        let json = serde_json::to_value(StressTestResponse::from(GatewayOutcome::LimitExceeded))
            .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["limitExceeded"], true);
        assert_eq!(json["remainingRequests"], 0);
        assert_eq!(json["message"], LIMIT_EXCEEDED_MESSAGE);
        assert!(json.get("result").is_none());
    }

    #[test]
    fn success_carries_result_and_remaining() {
        let outcome = GatewayOutcome::Success {
            result: fallback::simulate(Persona::Ip),
            remaining_requests: 3,
        };
        assert_eq!(outcome_code(&outcome).0, error_codes::SUCCESS);

        let json = serde_json::to_value(StressTestResponse::from(outcome)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["remainingRequests"], 3);
        assert!(json.get("limitExceeded").is_none());
        assert_eq!(json["result"]["interrogatories"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn configuration_error_is_distinct_from_call_failure() {
        let config = GatewayOutcome::ConfigurationError {
            remaining_requests: 2,
        };
        let failure = GatewayOutcome::CallFailure {
            remaining_requests: 2,
            reason: "API call failed".to_string(),
        };
        assert_eq!(outcome_code(&config).0, error_codes::CONFIG_ERROR);
        assert_eq!(outcome_code(&failure).0, error_codes::UPSTREAM_ERROR);

        let response = StressTestResponse::from(config);
        assert_eq!(response.error.as_deref(), Some(MISSING_KEY_ERROR));
        assert_eq!(response.remaining_requests, 2);
    }

    #[test]
    fn accepts_client_identifier_alias() {
        let req: StressTestRequest = serde_json::from_str(
            r#"{"persona":"jury","strategy":"s","clientIdentifier":"1.2.3.4"}"#,
        )
        .unwrap();
        assert_eq!(req.client_ip.as_deref(), Some("1.2.3.4"));
        let request = req.analysis_request();
        assert_eq!(request.persona, Persona::Jury);
        assert!(request.evidence_base64.is_none());
    }
}
