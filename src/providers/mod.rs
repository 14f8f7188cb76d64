//! 外部模型服务的 HTTP 适配层
//!
//! 编排逻辑只依赖这里的 trait，具体的请求格式、鉴权和响应解析都封装在各自的客户端中。

mod gemini;
mod qwen;
mod saul;

use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::model::PrimaryFindings;
use crate::config::Config;

pub use gemini::GeminiClient;
pub use qwen::QwenClient;
pub use saul::SaulClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} returned an unreadable body: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },
}

/// 附在主模型提示词后的内联图片（base64）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<InlineImage>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }
}

/// 主模型：生成结构化分析，同时负责最后的综合阶段
#[async_trait]
pub trait PrimaryModel: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError>;
}

/// 独立的第二意见模型
#[async_trait]
pub trait CritiqueModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// 有回复但内容为空时返回 `Ok(None)`
    async fn critique(
        &self,
        strategy: &str,
        findings: &PrimaryFindings,
    ) -> Result<Option<String>, ProviderError>;

    /// 回复为空时的占位文本
    fn unavailable_text(&self) -> &'static str;

    /// 调用失败时的占位文本
    fn offline_text(&self) -> &'static str;
}

/// 按调用方提供的密钥构造各个模型客户端
pub trait ModelProviders: Send + Sync {
    fn primary(&self, api_key: &str) -> Arc<dyn PrimaryModel>;
    fn devil_advocate(&self, api_key: &str) -> Arc<dyn CritiqueModel>;
    fn legal_scholar(&self, api_key: &str) -> Arc<dyn CritiqueModel>;
}

/// 生产环境使用的 HTTP 客户端集合，共享同一个连接池
#[derive(Clone)]
pub struct HttpProviders {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl HttpProviders {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl ModelProviders for HttpProviders {
    fn primary(&self, api_key: &str) -> Arc<dyn PrimaryModel> {
        Arc::new(GeminiClient::new(
            self.http.clone(),
            &self.config.gemini_endpoint,
            &self.config.gemini_model,
            api_key,
        ))
    }

    fn devil_advocate(&self, api_key: &str) -> Arc<dyn CritiqueModel> {
        Arc::new(QwenClient::new(
            self.http.clone(),
            &self.config.qwen_endpoint,
            &self.config.qwen_model,
            api_key,
        ))
    }

    fn legal_scholar(&self, api_key: &str) -> Arc<dyn CritiqueModel> {
        Arc::new(SaulClient::new(
            self.http.clone(),
            &self.config.saul_endpoint,
            api_key,
        ))
    }
}

/// 读取响应体，非 2xx 时带上响应内容返回错误
pub(crate) async fn read_success_body(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Http { provider, source })?;

    if !status.is_success() {
        tracing::error!("{} API error ({}): {}", provider, status, body);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
