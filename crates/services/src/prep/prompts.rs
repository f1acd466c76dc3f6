//! Prompt templates for answer generation, chosen by question tags.

use prep_core::model::Question;

const BEHAVIORAL: &str = "You are an expert career coach. Provide structured behavioral interview \
answers using the STAR framework (Situation, Task, Action, Result).

**Format:** Markdown with clear headings. Keep it practical and focused.
**Include:** Multiple scenarios when necessary.
";

const SYSTEM_DESIGN: &str = "You are a senior software architect. Provide practical system design answers.

**Format:** Markdown with headings (##, ###)
**Include:** Architecture patterns, trade-offs, scalability considerations, code examples when relevant
**Code Language:** TypeScript or JavaScript preferred
**Keep it:** Focused and practical. Avoid excessive ASCII diagrams; use simple diagrams only when they add real value.";

const ALGORITHM: &str = "You are a coding interview expert. Provide clear, practical algorithm explanations.

**Include:**
- Approach and intuition
- Time/space complexity
- Clean code implementation in TypeScript or JavaScript
- Key edge cases

**Format:** Markdown with code blocks. Keep it concise and interview-focused.";

const FRONTEND: &str = "You are an expert frontend engineer. Provide clear, practical answers for technical interviews.

**Structure:**
## Quick Summary (2-3 sentences)
## How It Works (with practical examples)
## Code Example (TypeScript/JavaScript preferred)
## Key Takeaways (bullet points)

**Rules:**
- Format in Markdown with headings
- Code in proper code blocks (```typescript or ```javascript)
- Be thorough but concise, focusing on what matters for interviews
- Skip ASCII art unless absolutely necessary
- Prefer code examples over diagrams";

/// Kind of answer the model is asked to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Behavioral,
    SystemDesign,
    Algorithm,
    Frontend,
}

impl PromptKind {
    /// Classify a comma-separated tag string. First match wins, in declaration order.
    #[must_use]
    pub fn for_tags(tags: &str) -> Self {
        let tags = tags.to_lowercase();
        if tags.contains("behavioral") {
            Self::Behavioral
        } else if tags.contains("system") || tags.contains("architecture") {
            Self::SystemDesign
        } else if tags.contains("algorithm") || tags.contains("coding") {
            Self::Algorithm
        } else {
            Self::Frontend
        }
    }

    #[must_use]
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Behavioral => BEHAVIORAL,
            Self::SystemDesign => SYSTEM_DESIGN,
            Self::Algorithm => ALGORITHM,
            Self::Frontend => FRONTEND,
        }
    }
}

#[must_use]
pub fn system_prompt(tags: &str) -> &'static str {
    PromptKind::for_tags(tags).system_prompt()
}

#[must_use]
pub fn user_prompt(question: &Question) -> String {
    let mut prompt = format!(
        "Interview Question: {}\nCategory: {}\nDifficulty: {}\n",
        question.title, question.tags, question.difficulty
    );
    let companies = question.company_names();
    if !companies.is_empty() {
        prompt.push_str("Asked by: ");
        prompt.push_str(&companies.join(", "));
        prompt.push('\n');
    }
    prompt.push_str("\nProvide a clear, practical interview answer in Markdown format.");
    prompt.push_str("\nUse TypeScript or JavaScript for code examples.");
    prompt.push_str("\nKeep it focused and concise: quality over quantity.");
    prompt
}
