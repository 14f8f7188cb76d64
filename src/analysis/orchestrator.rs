use std::sync::Arc;

use super::credentials::Credentials;
use super::fallback;
use super::model::{AnalysisResult, PrimaryFindings, Synthesis};
use super::AnalysisRequest;
use crate::providers::{CritiqueModel, ModelProviders, PrimaryModel, Prompt, ProviderError};

const NOT_CONSULTED: &str = "Not consulted";

/// 多阶段分析：主模型 → 两个可选的第二意见 → 主模型综合
///
/// 各阶段依次执行，综合阶段依赖前面全部输出。只有主阶段的调用失败会中止整个流程，
/// 其余阶段失败时以占位文本代替。
pub struct Orchestrator {
    primary: Arc<dyn PrimaryModel>,
    devil_advocate: Option<Arc<dyn CritiqueModel>>,
    legal_scholar: Option<Arc<dyn CritiqueModel>>,
}

impl Orchestrator {
    pub fn new(primary: Arc<dyn PrimaryModel>) -> Self {
        Self {
            primary,
            devil_advocate: None,
            legal_scholar: None,
        }
    }

    pub fn with_devil_advocate(mut self, model: Option<Arc<dyn CritiqueModel>>) -> Self {
        self.devil_advocate = model;
        self
    }

    pub fn with_legal_scholar(mut self, model: Option<Arc<dyn CritiqueModel>>) -> Self {
        self.legal_scholar = model;
        self
    }

    /// 没有主模型密钥时返回 `None`
    pub fn from_credentials(
        providers: &dyn ModelProviders,
        credentials: &Credentials,
    ) -> Option<Self> {
        let primary = providers.primary(credentials.gemini_key.as_deref()?);
        Some(
            Self::new(primary)
                .with_devil_advocate(
                    credentials
                        .qwen_key
                        .as_deref()
                        .map(|key| providers.devil_advocate(key)),
                )
                .with_legal_scholar(
                    credentials
                        .hf_key
                        .as_deref()
                        .map(|key| providers.legal_scholar(key)),
                ),
        )
    }

    pub async fn primary_stage(
        &self,
        request: &AnalysisRequest,
    ) -> Result<PrimaryFindings, ProviderError> {
        let text = self.primary.generate(&request.primary_prompt()).await?;
        Ok(PrimaryFindings::parse(&text))
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ProviderError> {
        let findings = self.primary_stage(request).await?;

        let qwen_critique = match &self.devil_advocate {
            Some(model) => Some(critique_stage(model.as_ref(), &request.strategy, &findings).await),
            None => None,
        };
        let saul_critique = match &self.legal_scholar {
            Some(model) => Some(critique_stage(model.as_ref(), &request.strategy, &findings).await),
            None => None,
        };

        let synthesis = self
            .synthesis_stage(
                &request.strategy,
                &findings,
                qwen_critique.as_deref(),
                saul_critique.as_deref(),
            )
            .await;

        let mut result = AnalysisResult::from(findings);
        result.qwen_critique = qwen_critique;
        result.saul_critique = saul_critique;
        result.best_answer = Some(synthesis.best_answer);
        result.final_verdict = Some(synthesis.final_verdict);
        Ok(result)
    }

    async fn synthesis_stage(
        &self,
        strategy: &str,
        findings: &PrimaryFindings,
        qwen_critique: Option<&str>,
        saul_critique: Option<&str>,
    ) -> Synthesis {
        let prompt = Prompt::text(synthesis_prompt(
            strategy,
            findings,
            qwen_critique,
            saul_critique,
        ));

        match self.primary.generate(&prompt).await {
            Ok(text) => Synthesis::parse(&text).unwrap_or_else(|| {
                tracing::error!("Synthesis error: response was not valid JSON");
                Synthesis::failed()
            }),
            Err(e) => {
                tracing::error!("Synthesis error: {}", e);
                Synthesis::failed()
            }
        }
    }
}

/// 单个第二意见阶段，任何失败都降级为占位文本
async fn critique_stage(
    model: &dyn CritiqueModel,
    strategy: &str,
    findings: &PrimaryFindings,
) -> String {
    match model.critique(strategy, findings).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::warn!("{} returned no critique", model.name());
            model.unavailable_text().to_string()
        }
        Err(e) => {
            tracing::warn!("{} critique failed: {}", model.name(), e);
            model.offline_text().to_string()
        }
    }
}

pub fn synthesis_prompt(
    strategy: &str,
    findings: &PrimaryFindings,
    qwen_critique: Option<&str>,
    saul_critique: Option<&str>,
) -> String {
    let questions =
        serde_json::to_string(&findings.interrogatories).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are the SUPREME LEGAL ANALYST "GEMINI JUDGE." You have consulted with multiple AI legal experts and must now synthesize their insights into a FINAL, AUTHORITATIVE response.

YOUR ROLE:
1. Review all inputs from your expert consultants
2. Synthesize the BEST possible legal answer/strategy recommendation
3. Deliver a FINAL VERDICT that weighs all perspectives

EXPERT CONSULTANTS' INPUTS:

### INITIAL ANALYSIS (Primary Adversarial Assessment):
- Vulnerability: {verdict}
- Key Questions: {questions}
- Contradiction Found: {contradiction}

### QWEN 3 CRITIQUE (Devil's Advocate):
{qwen}

### SAUL 7B LEGAL SCHOLAR (Case Law Expert):
{saul}

### ORIGINAL STRATEGY TO ANALYZE:
"{strategy}"

---

Based on ALL the above expert inputs AND your own advanced legal reasoning, provide:

1. **BEST ANSWER**: A synthesized, actionable legal strategy recommendation that addresses ALL identified vulnerabilities. This should be 2-3 sentences of clear, practical advice.

2. **FINAL VERDICT**: Your authoritative conclusion on the viability of this legal strategy. Rate it as: STRONG, MODERATE, WEAK, or CRITICAL RISK. Explain in 1 sentence.

Respond in JSON format:
{{
  "bestAnswer": "Your synthesized strategy recommendation here...",
  "finalVerdict": "[RATING] Your final judgment explanation..."
}}"#,
        verdict = findings.verdict,
        questions = questions,
        contradiction = findings.contradiction,
        qwen = qwen_critique.unwrap_or(NOT_CONSULTED),
        saul = saul_critique.unwrap_or(NOT_CONSULTED),
        strategy = strategy,
    )
}

/// 调用方自带密钥的完整分析路径，对外永远返回一个结果
///
/// 缺少主模型密钥或主阶段失败时返回该角色的模拟结果。
pub async fn analyze_with_credentials(
    providers: &dyn ModelProviders,
    credentials: &Credentials,
    request: &AnalysisRequest,
) -> AnalysisResult {
    let Some(orchestrator) = Orchestrator::from_credentials(providers, credentials) else {
        tracing::warn!("No primary API key provided, using simulated analysis");
        return fallback::simulate(request.persona);
    };

    match orchestrator.run(request).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("AI Error: {}", e);
            fallback::simulate(request.persona)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::{FALLBACK_VERDICT, SYNTHESIS_FAILED_BEST_ANSWER};
    use crate::analysis::Persona;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 按顺序返回预设回复，并记录收到的提示词
    struct ScriptedPrimary {
        replies: Mutex<Vec<Result<String, ()>>>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl ScriptedPrimary {
        fn new(replies: Vec<Result<&str, ()>>) -> Arc<Self> {
            let mut replies: Vec<_> = replies
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<Prompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PrimaryModel for ScriptedPrimary {
        async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            match self.replies.lock().unwrap().pop() {
                Some(Ok(text)) => Ok(text),
                _ => Err(ProviderError::Status {
                    provider: "scripted",
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    struct FixedCritique(Result<Option<&'static str>, ()>);

    #[async_trait]
    impl CritiqueModel for FixedCritique {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn critique(
            &self,
            _strategy: &str,
            _findings: &PrimaryFindings,
        ) -> Result<Option<String>, ProviderError> {
            match self.0 {
                Ok(text) => Ok(text.map(str::to_string)),
                Err(()) => Err(ProviderError::Decode {
                    provider: "fixed",
                    reason: "bad".to_string(),
                }),
            }
        }

        fn unavailable_text(&self) -> &'static str {
            "fixed unavailable"
        }

        fn offline_text(&self) -> &'static str {
            "fixed offline"
        }
    }

    const PRIMARY: &str = r#"```json
{"verdict": "Fragile.", "interrogatories": ["Q1", "Q2", "Q3"], "contradiction": "Dates clash."}
```"#;
    const SYNTHESIS: &str = r#"{"bestAnswer": "Get documents.", "finalVerdict": "[WEAK] Thin record."}"#;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(Persona::Judge, "The contract was implied.")
    }

    #[tokio::test]
    async fn runs_all_stages_and_aggregates() {
        let primary = ScriptedPrimary::new(vec![Ok(PRIMARY), Ok(SYNTHESIS)]);
        let orchestrator = Orchestrator::new(primary.clone())
            .with_devil_advocate(Some(Arc::new(FixedCritique(Ok(Some("Fair enough."))))))
            .with_legal_scholar(Some(Arc::new(FixedCritique(Ok(Some("Smith v. Jones."))))));

        let result = orchestrator.run(&request()).await.unwrap();

        assert_eq!(result.verdict, "Fragile.");
        assert_eq!(result.interrogatories, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(result.qwen_critique.as_deref(), Some("Fair enough."));
        assert_eq!(result.saul_critique.as_deref(), Some("Smith v. Jones."));
        assert_eq!(result.best_answer.as_deref(), Some("Get documents."));
        assert_eq!(result.final_verdict.as_deref(), Some("[WEAK] Thin record."));

        let prompts = primary.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].text.contains("Fair enough."));
        assert!(prompts[1].text.contains("Smith v. Jones."));
        assert!(prompts[1].text.contains(r#"Key Questions: ["Q1","Q2","Q3"]"#));
    }

    #[tokio::test]
    async fn absent_critiques_are_omitted_and_marked_not_consulted() {
        let primary = ScriptedPrimary::new(vec![Ok(PRIMARY), Ok(SYNTHESIS)]);
        let result = Orchestrator::new(primary.clone())
            .run(&request())
            .await
            .unwrap();

        assert!(result.qwen_critique.is_none());
        assert!(result.saul_critique.is_none());
        assert_eq!(result.best_answer.as_deref(), Some("Get documents."));

        let synthesis_prompt = &primary.prompts()[1].text;
        assert_eq!(synthesis_prompt.matches(NOT_CONSULTED).count(), 2);
    }

    #[tokio::test]
    async fn failing_critiques_degrade_to_placeholders() {
        let primary = ScriptedPrimary::new(vec![Ok(PRIMARY), Ok(SYNTHESIS)]);
        let result = Orchestrator::new(primary)
            .with_devil_advocate(Some(Arc::new(FixedCritique(Err(())))))
            .with_legal_scholar(Some(Arc::new(FixedCritique(Ok(None)))))
            .run(&request())
            .await
            .unwrap();

        assert_eq!(result.qwen_critique.as_deref(), Some("fixed offline"));
        assert_eq!(result.saul_critique.as_deref(), Some("fixed unavailable"));
        assert_eq!(result.verdict, "Fragile.");
    }

    #[tokio::test]
    async fn synthesis_failure_uses_placeholders() {
        let primary = ScriptedPrimary::new(vec![Ok(PRIMARY), Ok("not json at all")]);
        let result = Orchestrator::new(primary).run(&request()).await.unwrap();
        assert_eq!(result.best_answer.as_deref(), Some(SYNTHESIS_FAILED_BEST_ANSWER));

        let primary = ScriptedPrimary::new(vec![Ok(PRIMARY)]);
        let result = Orchestrator::new(primary).run(&request()).await.unwrap();
        assert_eq!(result.best_answer.as_deref(), Some(SYNTHESIS_FAILED_BEST_ANSWER));
        assert_eq!(result.verdict, "Fragile.");
    }

    #[tokio::test]
    async fn malformed_primary_reply_still_completes() {
        let primary = ScriptedPrimary::new(vec![Ok("Sorry, no."), Ok(SYNTHESIS)]);
        let result = Orchestrator::new(primary).run(&request()).await.unwrap();
        assert_eq!(result.verdict, FALLBACK_VERDICT);
        assert!(result.interrogatories.is_empty());
        assert!(!result.contradiction.is_empty());
    }

    #[tokio::test]
    async fn primary_failure_aborts_the_run() {
        let primary = ScriptedPrimary::new(vec![Err(())]);
        let outcome = Orchestrator::new(primary.clone())
            .with_devil_advocate(Some(Arc::new(FixedCritique(Ok(Some("unused"))))))
            .run(&request())
            .await;
        assert!(outcome.is_err());
        assert_eq!(primary.prompts().len(), 1);
    }

    struct StubProviders {
        primary: Arc<ScriptedPrimary>,
    }

    impl ModelProviders for StubProviders {
        fn primary(&self, _api_key: &str) -> Arc<dyn PrimaryModel> {
            self.primary.clone()
        }

        fn devil_advocate(&self, _api_key: &str) -> Arc<dyn CritiqueModel> {
            Arc::new(FixedCritique(Ok(Some("qwen says hi"))))
        }

        fn legal_scholar(&self, _api_key: &str) -> Arc<dyn CritiqueModel> {
            Arc::new(FixedCritique(Ok(Some("saul says hi"))))
        }
    }

    #[tokio::test]
    async fn credentials_select_the_optional_stages() {
        let providers = StubProviders {
            primary: ScriptedPrimary::new(vec![Ok(PRIMARY), Ok(SYNTHESIS)]),
        };
        let credentials = Credentials {
            gemini_key: Some("g".to_string()),
            hf_key: Some("h".to_string()),
            ..Default::default()
        };

        let result = analyze_with_credentials(&providers, &credentials, &request()).await;
        assert!(result.qwen_critique.is_none());
        assert_eq!(result.saul_critique.as_deref(), Some("saul says hi"));
    }

    #[tokio::test]
    async fn missing_key_or_primary_failure_falls_back_to_simulation() {
        let providers = StubProviders {
            primary: ScriptedPrimary::new(vec![Err(())]),
        };

        let without_key =
            analyze_with_credentials(&providers, &Credentials::default(), &request()).await;
        assert_eq!(without_key, fallback::simulate(Persona::Judge));

        let credentials = Credentials {
            gemini_key: Some("g".to_string()),
            ..Default::default()
        };
        let failed = analyze_with_credentials(&providers, &credentials, &request()).await;
        assert_eq!(failed, fallback::simulate(Persona::Judge));
    }
}
