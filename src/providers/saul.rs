use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{read_success_body, CritiqueModel, ProviderError};
use crate::analysis::model::PrimaryFindings;

const PROVIDER: &str = "saul";

/// Hugging Face 文本生成接口上的法律模型，只看原始策略
pub struct SaulClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

impl SaulClient {
    pub fn new(http: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(strategy: &str) -> GenerationRequest {
        GenerationRequest {
            inputs: format!(
                "[INST] You are a Legal Scholar trained on US Case Law. Provide 1 relevant legal precedent or case citation that either supports or refutes this strategy: \"{}\" [/INST]",
                strategy
            ),
            parameters: GenerationParameters {
                max_new_tokens: 150,
                temperature: 0.1,
                return_full_text: false,
            },
        }
    }

    /// 响应形如 `[{"generated_text": "..."}]`，出错时服务端返回对象
    fn generated_text(body: &str) -> Result<Option<String>, ProviderError> {
        let value: Value = serde_json::from_str(body).map_err(|e| ProviderError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        Ok(value
            .get(0)
            .and_then(|item| item.get("generated_text"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string))
    }
}

#[async_trait]
impl CritiqueModel for SaulClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn critique(
        &self,
        strategy: &str,
        _findings: &PrimaryFindings,
    ) -> Result<Option<String>, ProviderError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::request(strategy))
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body = read_success_body(PROVIDER, response).await?;
        Self::generated_text(&body)
    }

    fn unavailable_text(&self) -> &'static str {
        "Saul 7B Citation Unavailable."
    }

    fn offline_text(&self) -> &'static str {
        "Saul 7B Offline/Error."
    }
}
