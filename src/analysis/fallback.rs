//! 降级模拟：上游模型不可用时按角色返回固定的分析结果

use super::model::AnalysisResult;
use super::persona::Persona;

struct CannedResult {
    verdict: &'static str,
    interrogatories: [&'static str; 3],
    contradiction: &'static str,
    qwen_critique: &'static str,
    saul_critique: &'static str,
    best_answer: &'static str,
    final_verdict: &'static str,
}

impl CannedResult {
    fn to_result(&self) -> AnalysisResult {
        AnalysisResult {
            verdict: self.verdict.to_string(),
            interrogatories: self.interrogatories.iter().map(|q| q.to_string()).collect(),
            contradiction: self.contradiction.to_string(),
            qwen_critique: Some(self.qwen_critique.to_string()),
            saul_critique: Some(self.saul_critique.to_string()),
            best_answer: Some(self.best_answer.to_string()),
            final_verdict: Some(self.final_verdict.to_string()),
        }
    }
}

const JUDGE: CannedResult = CannedResult {
    verdict: "SIMULATION (Judge): The reliance on 'implied consent' fails strictly against the written denial.",
    interrogatories: [
        "Where is the physical record?",
        "Does the email constitute revocation?",
        "Why prioritize hearsay?",
    ],
    contradiction: "Timeline shows cessation of communication despite claims of 'good faith'.",
    qwen_critique: "Qwen 3 (Simulated): The Judge's point on written denial is legally sound. The emotional argument is weak.",
    saul_critique: "Saul 7B (Simulated): Cited Case: *Smith v. Jones (2019)* - Written revocation supersedes implied logic in contract disputes.",
    best_answer: "Focus on establishing explicit documented consent. Gather all written communications, timestamps, and witness statements. The emotional narrative is weaker than concrete evidence of the consent timeline.",
    final_verdict: "WEAK: Strategy relies too heavily on implied consent without documented evidence. Need to pivot to explicit consent documentation or risk dismissal.",
};

const COUNSEL: CannedResult = CannedResult {
    verdict: "SIMULATION (Counsel): Move to strike witness testimony as inadmissible hearsay.",
    interrogatories: [
        "Produce timestamped logs.",
        "Medical substantiation for distress?",
        "Why was evidence withheld?",
    ],
    contradiction: "Financial ruin claimed, but discretionary spending increased by 20%.",
    qwen_critique: "Qwen 3 (Simulated): Counsel is aggressive but the hearsay objection is valid procedural strategy.",
    saul_critique: "Saul 7B (Simulated): Cited Rule: Federal Rules of Evidence 802 - Hearsay Rule exceptions do not apply to uncorroborated diary entries.",
    best_answer: "Pre-empt the hearsay objection by securing corroborating witnesses BEFORE trial. Address the financial inconsistency by preparing a detailed timeline showing the 20% increase was necessary survival spending, not discretionary.",
    final_verdict: "MODERATE: Valid procedural strategy exists but critical evidentiary weaknesses must be addressed before proceeding to trial.",
};

const AUDITOR: CannedResult = CannedResult {
    verdict: "SIMULATION (Auditor): High risk of fiduciary breach due to undisclosed conflicts of interest.",
    interrogatories: [
        "Who approved the related-party transaction?",
        "Where is the independent valuation?",
        "Why was the board not notified?",
    ],
    contradiction: "Claims of 'transparency' clash with encrypted side-channel communications.",
    qwen_critique: "Qwen 3 (Simulated): The auditor correctly identifies the disclosure gap. Fiduciary duty is the primary exposure.",
    saul_critique: "Saul 7B (Simulated): PCAOB Standard 2410: Auditors must evaluate whether related party transactions have been appropriately identified and disclosed.",
    best_answer: "Immediately disclose all related-party transactions to the board and secure an independent third-party valuation. Document the decision-making process retroactively to establish good faith.",
    final_verdict: "CRITICAL RISK: Undisclosed conflicts and encrypted communications create severe fiduciary exposure. Immediate remediation required.",
};

const IP: CannedResult = CannedResult {
    verdict: "SIMULATION (IP): Potential infringement detected on existing 'one-click' utility patents.",
    interrogatories: [
        "Search for prior art in 2018.",
        "Is the algorithm non-obvious?",
        "Do you have a license for the data?",
    ],
    contradiction: "Claims original work but code snippet matches MIT-licensed library without attribution.",
    qwen_critique: "Qwen 3 (Simulated): IP focus on prior art is essential. The licensing flaw is a critical weakness.",
    saul_critique: "Saul 7B (Simulated): *Alice Corp. v. CLS Bank*: Abstract ideas implemented on a computer are not patentable without an 'inventive concept'.",
    best_answer: "Conduct a comprehensive prior art search before proceeding. Add proper MIT license attribution immediately. Consider design-around strategies to avoid the one-click patent claims.",
    final_verdict: "WEAK: Multiple IP vulnerabilities identified. Prior art and licensing issues must be resolved before any commercial deployment.",
};

const JURY: CannedResult = CannedResult {
    verdict: "SIMULATION (Jury): This story doesn't add up. He changed his story three times.",
    interrogatories: [
        "Why not call the police?",
        "Is this about justice or money?",
        "Timeline feels off.",
    ],
    contradiction: "Claimed terror but waited 4 days to report.",
    qwen_critique: "Qwen 3 (Simulated): The Jury's doubt on credibility is the biggest hurdle here. Emotional resonance is negative.",
    saul_critique: "Saul 7B (Simulated): Precedent: *State v. Miller* - Juror skepticism on delayed reporting in emotional distress claims is a documented factor in 78% of acquittals.",
    best_answer: "Rebuild credibility with consistent timeline documentation. Explain the 4-day delay with psychological expert testimony on trauma response. Focus less on emotion, more on verifiable facts.",
    final_verdict: "MODERATE: Credibility is the central issue. Expert testimony and timeline consistency can recover jury trust.",
};

pub fn simulate(persona: Persona) -> AnalysisResult {
    let canned = match persona {
        Persona::Judge => &JUDGE,
        Persona::Counsel => &COUNSEL,
        Persona::Auditor => &AUDITOR,
        Persona::Ip => &IP,
        Persona::Jury => &JURY,
    };
    canned.to_result()
}
