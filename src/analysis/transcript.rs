//! 会话记录导出为 markdown，以及从导出的文档中读回分析内容

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::AnalysisResult;
use super::persona::Persona;

const SEPARATOR: &str = "\n---\n\n";
const USER_HEADER: &str = "## USER [";
const ANALYSIS_HEADER: &str = "## LEXPATH ANALYSIS\n\n";
const VERDICT_HEADER: &str = "### Critical Vulnerability\n";
const INTERROGATORIES_HEADER: &str = "\n\n### Adversarial Interrogatories\n";
const CONTRADICTION_HEADER: &str = "\n\n### Logical Contradiction\n";
const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Analysis,
    Thinking,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: Option<MessageKind>,
    #[serde(default)]
    pub persona: Option<Persona>,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(persona: Persona, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            kind: None,
            persona: Some(persona),
            result: None,
            timestamp: Utc::now(),
        }
    }

    pub fn analysis(persona: Persona, result: AnalysisResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: String::new(),
            kind: Some(MessageKind::Analysis),
            persona: Some(persona),
            result: Some(result),
            timestamp: Utc::now(),
        }
    }

    fn to_markdown(&self) -> Option<String> {
        match (self.role, self.kind, &self.result) {
            (Role::User, _, _) => Some(format!(
                "{}{}]\n{}\n",
                USER_HEADER,
                self.persona.map(|p| p.title()).unwrap_or(UNKNOWN_TITLE),
                escape(&self.content)
            )),
            (Role::Assistant, Some(MessageKind::Analysis), Some(result)) => {
                let questions = result
                    .interrogatories
                    .iter()
                    .map(|q| format!("- {}", escape(q)))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(format!(
                    "{}{}{}{}{}{}{}\n",
                    ANALYSIS_HEADER,
                    VERDICT_HEADER,
                    escape(&result.verdict),
                    INTERROGATORIES_HEADER,
                    questions,
                    CONTRADICTION_HEADER,
                    escape(&result.contradiction)
                ))
            }
            // 思考中和错误提示不导出
            _ => None,
        }
    }
}

/// 从导出文档中读回的一段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum TranscriptEntry {
    #[serde(rename_all = "camelCase")]
    User {
        persona: Option<Persona>,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Analysis {
        verdict: String,
        interrogatories: Vec<String>,
        contradiction: String,
    },
}

pub fn export_markdown(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter_map(ChatMessage::to_markdown)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// 解析 `export_markdown` 生成的文档，无法识别的段落会被跳过
pub fn parse_markdown(document: &str) -> Vec<TranscriptEntry> {
    let normalized = document.replace("\r\n", "\n");
    normalized
        .split(SEPARATOR)
        .filter_map(|section| parse_user(section).or_else(|| parse_analysis(section)))
        .collect()
}

fn parse_user(section: &str) -> Option<TranscriptEntry> {
    let rest = section.strip_prefix(USER_HEADER)?;
    let (title, content) = rest.split_once("]\n")?;
    Some(TranscriptEntry::User {
        persona: Persona::from_title(title),
        content: unescape(strip_trailing_newline(content)),
    })
}

fn parse_analysis(section: &str) -> Option<TranscriptEntry> {
    let body = section
        .strip_prefix(ANALYSIS_HEADER)?
        .strip_prefix(VERDICT_HEADER)?;
    let (verdict, rest) = body.split_once(INTERROGATORIES_HEADER)?;
    let (questions, contradiction) = rest.split_once(CONTRADICTION_HEADER)?;

    let mut interrogatories: Vec<String> = Vec::new();
    for line in questions.split('\n') {
        match line.strip_prefix("- ") {
            Some(question) => interrogatories.push(unescape_line(question).to_string()),
            // 多行问题的续行
            None => {
                if let Some(last) = interrogatories.last_mut() {
                    last.push('\n');
                    last.push_str(unescape_line(line));
                }
            }
        }
    }

    Some(TranscriptEntry::Analysis {
        verdict: unescape(verdict),
        interrogatories,
        contradiction: unescape(strip_trailing_newline(contradiction)),
    })
}

/// 正文中以 `\`、`-`、`#` 开头的行加一个反斜杠，避免与分隔线、标题和列表项混淆
fn escape(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.starts_with(['\\', '-', '#']) {
                format!("\\{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape(text: &str) -> String {
    text.split('\n')
        .map(unescape_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_line(line: &str) -> &str {
    line.strip_prefix('\\').unwrap_or(line)
}

fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}
