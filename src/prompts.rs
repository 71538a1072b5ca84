//! Prompt templates for the summarizer and the four analyst agents.
//!
//! Every prompt lives here so the pipeline modules only deal with call
//! ordering and error handling. Unit tests inspect the templates directly.

use crate::models::AgentRole;

/// Instruction that compresses raw document text into a structured brief.
///
/// `{document}` is replaced by [`summary_prompt`].
pub const SUMMARY_PROMPT: &str = r#"Summarize the following financial document into a structured financial brief.

Extract only:
- Revenue
- Net income
- Operating margin
- Cash flow
- Growth trends
- Major financial risks

Limit response to 700 words.

Document:
{document}"#;

/// Build the summarizer prompt for a document.
pub fn summary_prompt(document: &str) -> String {
    SUMMARY_PROMPT.replace("{document}", document)
}

/// A fixed persona bound to one stage of the agent pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    /// Stage instruction; the summary is appended by [`task_prompt`].
    pub task: &'static str,
    pub expected_output: &'static str,
}

const VERIFIER: Persona = Persona {
    role: "Financial Document Verifier",
    goal: "Verify whether the provided financial summary contains structured financial data.",
    backstory: "Expert in financial compliance and structured financial validation.",
    task: "Using the financial summary below, determine whether it contains structured financial \
           information such as revenue, income statements, margins, or cash flow.",
    expected_output: "Confirmation with reasoning.",
};

const FINANCIAL_ANALYST: Persona = Persona {
    role: "Senior Financial Analyst",
    goal: "Analyze the provided financial summary and extract financial insights.",
    backstory: "Expert in corporate financial statements and profitability analysis.",
    task: "Using the financial summary below, analyze:\n\
           - Revenue trends\n\
           - Net income\n\
           - Operating margins\n\
           - Cash flow\n\
           - Growth patterns",
    expected_output: "Structured financial analysis.",
};

const INVESTMENT_ADVISOR: Persona = Persona {
    role: "Investment Advisor",
    goal: "Provide investment recommendations using the financial summary.",
    backstory: "Certified portfolio strategist and valuation specialist.",
    task: "Using only the financial summary below, provide:\n\
           - Strengths\n\
           - Weaknesses\n\
           - Short-term outlook\n\
           - Long-term outlook\n\
           - Buy/Hold/Sell recommendation",
    expected_output: "Structured investment recommendation.",
};

const RISK_ASSESSOR: Persona = Persona {
    role: "Risk Assessment Specialist",
    goal: "Evaluate financial and market risks using the financial summary.",
    backstory: "Specialist in risk modeling and macroeconomic exposure.",
    task: "Using only the financial summary below, evaluate:\n\
           - Financial risks\n\
           - Liquidity risks\n\
           - Revenue volatility\n\
           - Market risks\n\
           - Overall risk rating",
    expected_output: "Structured risk assessment.",
};

/// The persona for a pipeline stage.
pub fn persona(role: AgentRole) -> &'static Persona {
    match role {
        AgentRole::Verifier => &VERIFIER,
        AgentRole::FinancialAnalyst => &FINANCIAL_ANALYST,
        AgentRole::InvestmentAdvisor => &INVESTMENT_ADVISOR,
        AgentRole::RiskAssessor => &RISK_ASSESSOR,
    }
}

/// System message establishing the persona.
pub fn system_prompt(persona: &Persona) -> String {
    format!(
        "You are a {}. {}\nYour goal: {}\nWork alone; do not delegate.",
        persona.role, persona.backstory, persona.goal
    )
}

/// User message for one stage: instruction, caller query, shared summary.
pub fn task_prompt(persona: &Persona, query: &str, summary: &str) -> String {
    format!(
        "{}\n\nInvestor request: {}\n\nFinancial Summary:\n{}\n\nExpected output: {}",
        persona.task, query, summary, persona.expected_output
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_document_and_word_cap() {
        let p = summary_prompt("Revenue grew 12%.");
        assert!(p.ends_with("Revenue grew 12%."));
        assert!(p.contains("Limit response to 700 words."));
        for item in [
            "Revenue",
            "Net income",
            "Operating margin",
            "Cash flow",
            "Growth trends",
            "Major financial risks",
        ] {
            assert!(p.contains(&format!("- {item}")), "missing {item}");
        }
    }

    #[test]
    fn every_role_has_distinct_persona() {
        let roles: std::collections::HashSet<&str> =
            AgentRole::ALL.iter().map(|r| persona(*r).role).collect();
        assert_eq!(roles.len(), 4);
    }

    #[test]
    fn task_prompt_carries_query_and_summary() {
        let p = task_prompt(persona(AgentRole::RiskAssessor), "Is it safe?", "BRIEF");
        assert!(p.contains("Overall risk rating"));
        assert!(p.contains("Investor request: Is it safe?"));
        assert!(p.contains("Financial Summary:\nBRIEF"));
        assert!(p.ends_with("Expected output: Structured risk assessment."));
    }

    #[test]
    fn system_prompt_names_role() {
        let p = system_prompt(persona(AgentRole::Verifier));
        assert!(p.starts_with("You are a Financial Document Verifier."));
    }
}
