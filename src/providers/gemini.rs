use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{read_success_body, PrimaryModel, Prompt, ProviderError};

const PROVIDER: &str = "gemini";

pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                endpoint.trim_end_matches('/'),
                model
            ),
            api_key: api_key.to_string(),
        }
    }

    fn request_body(prompt: &Prompt) -> GenerateContentRequest<'_> {
        let mut parts = vec![Part::Text { text: &prompt.text }];
        if let Some(image) = &prompt.image {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        GenerateContentRequest {
            contents: vec![Content { parts }],
        }
    }

    /// 取第一个候选的第一段文本，没有时返回空串
    fn first_text(body: &str) -> Result<String, ProviderError> {
        let response: GenerateContentResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        Ok(response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl PrimaryModel for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body = read_success_body(PROVIDER, response).await?;
        Self::first_text(&body)
    }
}
