use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_VERDICT: &str = "Analysis Inconclusive";
pub const FALLBACK_CONTRADICTION: &str = "No specific contradiction found.";
pub const FALLBACK_BEST_ANSWER: &str = "Unable to synthesize recommendation.";
pub const FALLBACK_FINAL_VERDICT: &str = "INCONCLUSIVE: Insufficient data for verdict.";
pub const SYNTHESIS_FAILED_BEST_ANSWER: &str =
    "Synthesis unavailable. Review individual AI critiques above.";
pub const SYNTHESIS_FAILED_FINAL_VERDICT: &str =
    "INCONCLUSIVE: Synthesis failed. Consider individual expert opinions.";

/// 一次分析请求的完整结果，只在请求期间存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: String,
    pub interrogatories: Vec<String>,
    pub contradiction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qwen_critique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saul_critique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_verdict: Option<String>,
}

impl AnalysisResult {
    pub fn severity(&self) -> Option<Severity> {
        self.final_verdict.as_deref().and_then(Severity::from_verdict)
    }
}

impl From<PrimaryFindings> for AnalysisResult {
    fn from(findings: PrimaryFindings) -> Self {
        Self {
            verdict: findings.verdict,
            interrogatories: findings.interrogatories,
            contradiction: findings.contradiction,
            qwen_critique: None,
            saul_critique: None,
            best_answer: None,
            final_verdict: None,
        }
    }
}

/// 主模型给出的结构化结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryFindings {
    pub verdict: String,
    pub interrogatories: Vec<String>,
    pub contradiction: String,
}

impl PrimaryFindings {
    /// 解析主模型输出；字段缺失或整体无法解析时逐字段使用默认值
    pub fn parse(text: &str) -> Self {
        let value = parse_model_json(text);
        if value.is_none() {
            tracing::warn!("primary response was not valid JSON, using fallback fields");
        }
        let value = value.unwrap_or(Value::Null);

        Self {
            verdict: string_field(&value, "verdict")
                .unwrap_or_else(|| FALLBACK_VERDICT.to_string()),
            interrogatories: value
                .get("interrogatories")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            contradiction: string_field(&value, "contradiction")
                .unwrap_or_else(|| FALLBACK_CONTRADICTION.to_string()),
        }
    }
}

/// 综合阶段的最终建议与裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub best_answer: String,
    pub final_verdict: String,
}

impl Synthesis {
    pub fn parse(text: &str) -> Option<Self> {
        let value = parse_model_json(text)?;
        Some(Self {
            best_answer: string_field(&value, "bestAnswer")
                .unwrap_or_else(|| FALLBACK_BEST_ANSWER.to_string()),
            final_verdict: string_field(&value, "finalVerdict")
                .unwrap_or_else(|| FALLBACK_FINAL_VERDICT.to_string()),
        })
    }

    pub fn failed() -> Self {
        Self {
            best_answer: SYNTHESIS_FAILED_BEST_ANSWER.to_string(),
            final_verdict: SYNTHESIS_FAILED_FINAL_VERDICT.to_string(),
        }
    }
}

/// 最终裁决的四档评级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Strong,
    Moderate,
    Weak,
    CriticalRisk,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Strong => "STRONG",
            Severity::Moderate => "MODERATE",
            Severity::Weak => "WEAK",
            Severity::CriticalRisk => "CRITICAL RISK",
        }
    }

    /// 从 "[WEAK] ..." 或 "WEAK: ..." 形式的裁决中取出评级
    pub fn from_verdict(verdict: &str) -> Option<Self> {
        let head = verdict.trim_start().trim_start_matches('[').to_ascii_uppercase();
        [
            Severity::CriticalRisk,
            Severity::Moderate,
            Severity::Strong,
            Severity::Weak,
        ]
        .into_iter()
        .find(|s| head.starts_with(s.label()))
    }
}

/// 去掉模型回复中的 markdown 代码块标记
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// 按 JSON 解析模型回复；整段失败时退而截取首尾花括号之间的内容
pub fn parse_model_json(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return value.is_object().then_some(value);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&cleaned[start..=end])
        .ok()
        .filter(Value::is_object)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_before_parsing() {
        let text = "```json\n{\"verdict\": \"Weak\", \"interrogatories\": [\"Q1\", \"Q2\"], \"contradiction\": \"C\"}\n```";
        let findings = PrimaryFindings::parse(text);
        assert_eq!(findings.verdict, "Weak");
        assert_eq!(findings.interrogatories, vec!["Q1", "Q2"]);
        assert_eq!(findings.contradiction, "C");
    }

    #[test]
    fn invalid_json_yields_non_empty_fallbacks() {
        let findings = PrimaryFindings::parse("I'm sorry, I cannot comply.");
        assert_eq!(findings.verdict, FALLBACK_VERDICT);
        assert_eq!(findings.contradiction, FALLBACK_CONTRADICTION);
        assert!(findings.interrogatories.is_empty());
    }

    #[test]
    fn missing_fields_default_individually() {
        let findings = PrimaryFindings::parse(r#"{"verdict": "", "interrogatories": "not a list"}"#);
        assert_eq!(findings.verdict, FALLBACK_VERDICT);
        assert!(findings.interrogatories.is_empty());
        assert_eq!(findings.contradiction, FALLBACK_CONTRADICTION);
    }

    #[test]
    fn recovers_object_wrapped_in_prose() {
        let value = parse_model_json("Here you go: {\"bestAnswer\": \"Do X\"} thanks").unwrap();
        assert_eq!(value["bestAnswer"], "Do X");
        assert!(parse_model_json("[1, 2, 3]").is_none());
    }

    #[test]
    fn synthesis_defaults_missing_fields() {
        let synthesis = Synthesis::parse(r#"{"finalVerdict": "[STRONG] Solid."}"#).unwrap();
        assert_eq!(synthesis.best_answer, FALLBACK_BEST_ANSWER);
        assert_eq!(synthesis.final_verdict, "[STRONG] Solid.");
        assert!(Synthesis::parse("nope").is_none());
    }

    #[test]
    fn severity_reads_both_label_styles() {
        assert_eq!(Severity::from_verdict("[CRITICAL RISK] Bad."), Some(Severity::CriticalRisk));
        assert_eq!(Severity::from_verdict("WEAK: Needs work."), Some(Severity::Weak));
        assert_eq!(Severity::from_verdict("moderate - fine"), Some(Severity::Moderate));
        assert_eq!(Severity::from_verdict("INCONCLUSIVE: nothing"), None);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let result = AnalysisResult::from(PrimaryFindings::parse("{}"));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("qwenCritique").is_none());
        assert!(json.get("finalVerdict").is_none());
        assert_eq!(json["verdict"], FALLBACK_VERDICT);
    }
}
