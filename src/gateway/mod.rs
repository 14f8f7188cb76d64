//! 免费额度网关：按客户端标识限流，放行后只调用主模型阶段

use std::sync::Arc;

use crate::analysis::{AnalysisRequest, AnalysisResult, Orchestrator};
use crate::providers::ModelProviders;
use crate::usage::{LedgerError, UsageLedger, UNKNOWN_IDENTIFIER};

/// 网关的四种结果，都带剩余次数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Success {
        result: AnalysisResult,
        remaining_requests: u32,
    },
    LimitExceeded,
    ConfigurationError {
        remaining_requests: u32,
    },
    CallFailure {
        remaining_requests: u32,
        reason: String,
    },
}

impl GatewayOutcome {
    pub fn remaining_requests(&self) -> u32 {
        match self {
            GatewayOutcome::LimitExceeded => 0,
            GatewayOutcome::Success {
                remaining_requests, ..
            }
            | GatewayOutcome::ConfigurationError { remaining_requests }
            | GatewayOutcome::CallFailure {
                remaining_requests, ..
            } => *remaining_requests,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSummary {
    pub remaining_requests: u32,
    pub total_used: u32,
}

pub struct RequestGateway {
    ledger: Arc<dyn UsageLedger>,
    providers: Arc<dyn ModelProviders>,
    server_api_key: Option<String>,
    limit: u32,
}

impl RequestGateway {
    pub fn new(
        ledger: Arc<dyn UsageLedger>,
        providers: Arc<dyn ModelProviders>,
        server_api_key: Option<String>,
        limit: u32,
    ) -> Self {
        Self {
            ledger,
            providers,
            server_api_key,
            limit,
        }
    }

    fn remaining_after(&self, count: u32) -> u32 {
        self.limit.saturating_sub(count)
    }

    /// 处理一次免费请求
    ///
    /// 超额时直接拒绝，不计数也不调用模型；放行时先扣减额度再调用模型，
    /// 调用失败不退还。检查和扣减由账本一次原子完成。
    pub async fn submit(
        &self,
        identifier: Option<&str>,
        request: &AnalysisRequest,
    ) -> GatewayOutcome {
        let identifier = resolve_identifier(identifier);

        let count = match self.ledger.try_consume(identifier, self.limit).await {
            Ok(Some(count)) => count,
            Ok(None) => {
                tracing::info!("free request limit reached for {}", identifier);
                return GatewayOutcome::LimitExceeded;
            }
            Err(e) => return ledger_failure(identifier, e),
        };
        let remaining_requests = self.remaining_after(count);
        tracing::info!(
            "admitted request {} for {} ({} remaining)",
            count,
            identifier,
            remaining_requests
        );

        let Some(api_key) = self.server_api_key.as_deref() else {
            tracing::error!("Server configuration error: missing primary API key");
            return GatewayOutcome::ConfigurationError { remaining_requests };
        };

        let orchestrator = Orchestrator::new(self.providers.primary(api_key));
        match orchestrator.primary_stage(request).await {
            Ok(findings) => GatewayOutcome::Success {
                result: AnalysisResult::from(findings),
                remaining_requests,
            },
            Err(e) => {
                tracing::error!("Stress test error: {}", e);
                GatewayOutcome::CallFailure {
                    remaining_requests,
                    reason: "API call failed".to_string(),
                }
            }
        }
    }

    pub async fn usage(&self, identifier: Option<&str>) -> Result<UsageSummary, LedgerError> {
        let total_used = self
            .ledger
            .current_count(resolve_identifier(identifier))
            .await?;
        Ok(UsageSummary {
            remaining_requests: self.remaining_after(total_used),
            total_used,
        })
    }

    pub async fn reset_usage(&self) -> Result<u64, LedgerError> {
        let deleted = self.ledger.reset_all().await?;
        tracing::warn!("usage ledger reset, {} records deleted", deleted);
        Ok(deleted)
    }
}

/// 空标识归入共享的 "unknown" 桶
pub fn resolve_identifier(identifier: Option<&str>) -> &str {
    identifier
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_IDENTIFIER)
}

fn ledger_failure(identifier: &str, error: LedgerError) -> GatewayOutcome {
    tracing::error!("usage ledger unavailable for {}: {}", identifier, error);
    GatewayOutcome::CallFailure {
        remaining_requests: 0,
        reason: "Usage tracking unavailable".to_string(),
    }
}
