//! 分析编排：角色提示词、多阶段模型调用、降级模拟和会话导出

pub mod credentials;
pub mod fallback;
pub mod model;
pub mod orchestrator;
pub mod persona;
pub mod transcript;

use crate::providers::{InlineImage, Prompt};

pub use credentials::Credentials;
pub use model::{AnalysisResult, PrimaryFindings, Severity};
pub use orchestrator::{analyze_with_credentials, Orchestrator};
pub use persona::Persona;

const EVIDENCE_NOTICE: &str =
    "\n\n[VISUAL EVIDENCE ATTACHED: Analyze this image for contradictions against the strategy.]";

/// 一次待分析的策略
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub persona: Persona,
    pub strategy: String,
    pub evidence_base64: Option<String>,
}

impl AnalysisRequest {
    pub fn new(persona: Persona, strategy: impl Into<String>) -> Self {
        Self {
            persona,
            strategy: strategy.into(),
            evidence_base64: None,
        }
    }

    pub fn with_evidence(mut self, evidence_base64: impl Into<String>) -> Self {
        self.evidence_base64 = Some(evidence_base64.into());
        self
    }

    /// 证据可以是裸 base64，也可以是 `data:<mime>;base64,<data>` 形式
    pub fn evidence(&self) -> Option<InlineImage> {
        let raw = self.evidence_base64.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        match raw.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
            Some((meta, data)) => {
                let mime = meta.trim_end_matches(";base64");
                let mut image = InlineImage::jpeg(data);
                if !mime.is_empty() {
                    image.mime_type = mime.to_string();
                }
                Some(image)
            }
            None => Some(InlineImage::jpeg(raw)),
        }
    }

    /// 主阶段提示词：角色指令 + 策略原文，有证据时附加图片
    pub fn primary_prompt(&self) -> Prompt {
        let mut text = format!(
            "{}\n\nCASE STRATEGY TO ANALYZE:\n\"{}\"\n\nRespond strictly in JSON.",
            self.persona.instructions(),
            self.strategy
        );
        let image = self.evidence();
        if image.is_some() {
            text.push_str(EVIDENCE_NOTICE);
        }
        Prompt { text, image }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_evidence_is_text_only() {
        let prompt = AnalysisRequest::new(Persona::Jury, "He said, she said").primary_prompt();
        assert!(prompt.text.starts_with(Persona::Jury.instructions()));
        assert!(prompt.text.contains("CASE STRATEGY TO ANALYZE:\n\"He said, she said\""));
        assert!(prompt.text.ends_with("Respond strictly in JSON."));
        assert!(prompt.image.is_none());
    }

    #[test]
    fn evidence_adds_notice_and_attachment() {
        let prompt = AnalysisRequest::new(Persona::Judge, "x")
            .with_evidence("/9j/4AAQ")
            .primary_prompt();
        assert!(prompt.text.ends_with(EVIDENCE_NOTICE));
        assert_eq!(prompt.image, Some(InlineImage::jpeg("/9j/4AAQ")));
    }

    #[test]
    fn data_url_evidence_keeps_its_mime_type() {
        let request =
            AnalysisRequest::new(Persona::Ip, "x").with_evidence("data:image/png;base64,iVBORw0K");
        let image = request.evidence().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0K");

        let blank = AnalysisRequest::new(Persona::Ip, "x").with_evidence("   ");
        assert!(blank.evidence().is_none());
    }
}
