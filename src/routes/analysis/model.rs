use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisRequest, Credentials, Persona};

/// 调用方自带密钥的分析请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectAnalysisRequest {
    /// 未知角色按陪审团处理，不在反序列化时拒绝
    #[serde(default)]
    pub persona: String,
    pub strategy: String,
    #[serde(default)]
    pub evidence_base64: Option<String>,
    #[serde(default)]
    pub credentials: Credentials,
}

impl DirectAnalysisRequest {
    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            persona: Persona::resolve(&self.persona),
            strategy: self.strategy.clone(),
            evidence_base64: self.evidence_base64.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaInfo {
    pub persona: &'static str,
    pub title: &'static str,
}
