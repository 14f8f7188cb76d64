use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{read_success_body, CritiqueModel, ProviderError};
use crate::analysis::model::PrimaryFindings;

const PROVIDER: &str = "qwen";

const SYSTEM_PROMPT: &str = "You are a neutral 'Devil's Advocate'. Review the ANALYSIS provided by another AI. Is it fair? Does it miss any 'Blind Spots'? Provide a 1-sentence critique.";

/// OpenAI 兼容的 chat completion 接口
pub struct QwenClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

impl QwenClient {
    pub fn new(http: reqwest::Client, endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn messages(strategy: &str, findings: &PrimaryFindings) -> Result<Vec<ChatMessage>, ProviderError> {
        let analysis = serde_json::to_string(findings).map_err(|e| ProviderError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        Ok(vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Original Strategy: \"{}\"\n\nAI Analysis: {}",
                    strategy, analysis
                ),
            },
        ])
    }

    fn first_content(body: &str) -> Result<Option<String>, ProviderError> {
        let response: ChatCompletionResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .filter(|content| !content.trim().is_empty()))
    }
}

#[async_trait]
impl CritiqueModel for QwenClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn critique(
        &self,
        strategy: &str,
        findings: &PrimaryFindings,
    ) -> Result<Option<String>, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: Self::messages(strategy, findings)?,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body = read_success_body(PROVIDER, response).await?;
        Self::first_content(&body)
    }

    fn unavailable_text(&self) -> &'static str {
        "Qwen Critique Unavailable."
    }

    fn offline_text(&self) -> &'static str {
        "Qwen 3 Offline/Error."
    }
}
