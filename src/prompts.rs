//! Prompts for company-description generation.
//!
//! Kept apart from [`crate::summarize`] so prompt wording can be inspected in
//! tests and changed without touching provider handling.

/// System prompt: short neutral descriptions, no invented specifics.
pub const DESCRIPTION_SYSTEM_PROMPT: &str = r#"You help a user maintain a personal job applications tracker.
You write short, neutral, factual-sounding descriptions of companies.
If you cannot confidently identify the company from its name alone, you must say something generic like:
'A business or organization named <name>; specific public details are not readily available.'
Do NOT invent specific details such as revenue, exact employee counts, or specific product names."#;

/// User message asking for a one-to-two sentence description of `company`.
pub fn description_request(company: &str) -> String {
    format!(
        "Company name: {company}\n\n\
         Write a concise 1–2 sentence description of what this company does.\n\
         Return only the description text, no bullet points or extra commentary."
    )
}
