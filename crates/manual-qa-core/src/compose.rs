//! Answer composition: context assembly, prompt templates, and citations.
//!
//! The composer receives the re-ranked chunks (at most the context budget),
//! tags each with its source and page, joins them with [`CONTEXT_DELIMITER`]
//! in the order given, and wraps the result in one of six instruction
//! templates selected by [`Intent`]. Every prompt carries the instruction to
//! answer with [`NO_ANSWER`] when the manuals do not contain the answer.

use crate::intent::Intent;
use crate::memory::Turn;
use crate::models::RetrievedChunk;

/// Separator between documents in the context block.
pub const CONTEXT_DELIMITER: &str = "\n---\n";

/// The sentence the model must use when the context lacks the answer.
pub const NO_ANSWER: &str = "I don't have that specific information in the available manuals.";

/// Placeholder used in the rewrite prompt when too little history exists.
pub const NO_HISTORY: &str = "No relevant history";

const SAFETY_INSTRUCTIONS: &str = "CRITICAL SAFETY INSTRUCTIONS:
- Always start with safety warnings if present
- List ALL safety precautions mentioned
- Use clear warning symbols ⚠️ for dangers
- Be explicit about risks and consequences
- Never omit or minimize safety information";

const PROCEDURE_INSTRUCTIONS: &str = "PROCEDURE INSTRUCTIONS:
- List steps in exact numerical order
- Include required tools and materials
- Mention safety steps before procedure steps
- Include verification/check steps
- Be precise with measurements and settings";

const TROUBLESHOOTING_INSTRUCTIONS: &str = "TROUBLESHOOTING INSTRUCTIONS:
- List possible causes from most to least likely
- Include diagnostic steps to identify the issue
- Provide clear resolution steps
- Mention any required tools or parts
- State when professional help is needed";

const SPECIFICATION_INSTRUCTIONS: &str = "SPECIFICATION INSTRUCTIONS:
- Provide exact values with units
- Include acceptable ranges if specified
- Mention measurement conditions if relevant
- Reference the exact source document";

const DEFINITION_INSTRUCTIONS: &str = "DEFINITION INSTRUCTIONS:
- Provide clear, concise definitions
- Include context from the manual
- Mention related terms if applicable
- Reference the source document";

const GENERAL_INSTRUCTIONS: &str = "GENERAL INSTRUCTIONS:
- Be precise and technical
- Include specific values when available
- Cite the source document for key information
- If information is incomplete, state what's missing";

/// Instruction block for an intent.
pub fn instructions(intent: Intent) -> &'static str {
    match intent {
        Intent::Safety => SAFETY_INSTRUCTIONS,
        Intent::Procedure => PROCEDURE_INSTRUCTIONS,
        Intent::Troubleshooting => TROUBLESHOOTING_INSTRUCTIONS,
        Intent::Specification => SPECIFICATION_INSTRUCTIONS,
        Intent::Definition => DEFINITION_INSTRUCTIONS,
        Intent::General => GENERAL_INSTRUCTIONS,
    }
}

/// Join chunks into the context block, preserving their order.
///
/// Each part reads `DOCUMENT <n> [Source: <source>, Page: <page>]:` followed
/// by the chunk text, numbered from 1.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "DOCUMENT {} [Source: {}, Page: {}]:\n{}",
                i + 1,
                r.chunk.provenance.source,
                r.chunk.provenance.page,
                r.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Full answer prompt for `question` over `context`.
pub fn build_prompt(context: &str, question: &str, intent: Intent) -> String {
    format!(
        "You are a manufacturing automation expert answering questions from technical manuals.

{instructions}

CONTEXT FROM TECHNICAL MANUALS:
{context}

QUESTION: {question}

ANSWER GUIDELINES:
1. Answer based ONLY on the context provided
2. If the context doesn't contain the answer, say: \"{no_answer}\"
3. For safety questions, always start with safety warnings
4. For procedures, use numbered lists
5. Be concise but complete
6. Reference which document(s) you're using (e.g., \"Based on Document 1...\")

ANSWER:",
        instructions = instructions(intent),
        context = context,
        question = question,
        no_answer = NO_ANSWER,
    )
}

/// Render turns as alternating `User:` / `Assistant:` lines.
pub fn format_history(turns: &[Turn]) -> String {
    let mut lines = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        lines.push(format!("User: {}", turn.user));
        lines.push(format!("Assistant: {}", turn.assistant));
    }
    lines.join("\n")
}

/// Prompt asking the model to turn a follow-up into a standalone query.
///
/// The last `window` turns are included only when at least `window` turns
/// exist; otherwise the history section reads [`NO_HISTORY`].
pub fn build_rewrite_prompt(history: &[Turn], question: &str, intent: Intent, window: usize) -> String {
    let recent = if window > 0 && history.len() >= window {
        format_history(&history[history.len() - window..])
    } else {
        NO_HISTORY.to_string()
    };

    format!(
        "Rewrite this manufacturing question to be standalone and optimized for search.

Conversation context (last {window} exchanges):
{recent}

Current question: {question}

Question type: {intent}

Rewrite to include relevant manufacturing keywords for better document retrieval.
Keep it concise and clear.

Rewritten question:"
    )
}

/// Up to `max` unique `"source (page N)"` labels, in chunk order.
pub fn collect_sources(chunks: &[RetrievedChunk], max: usize) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for r in chunks {
        if sources.len() == max {
            break;
        }
        let label = r.chunk.provenance.label();
        if !sources.contains(&label) {
            sources.push(label);
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::build_chunk;
    use crate::models::{Category, Provenance};

    fn retrieved(text: &str, source: &str, page: u32) -> RetrievedChunk {
        RetrievedChunk {
            chunk: build_chunk(text, Category::Content, &Provenance::new(source, page), 0),
            score: 0.9,
        }
    }

    #[test]
    fn test_context_preserves_order_and_tags() {
        let ctx = build_context(&[
            retrieved("first text", "a.pdf", 2),
            retrieved("second text", "b.pdf", 7),
        ]);
        let parts: Vec<&str> = ctx.split(CONTEXT_DELIMITER).collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "DOCUMENT 1 [Source: a.pdf, Page: 2]:\nfirst text");
        assert_eq!(parts[1], "DOCUMENT 2 [Source: b.pdf, Page: 7]:\nsecond text");
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_every_prompt_carries_fallback() {
        for intent in Intent::ALL {
            let prompt = build_prompt("", "What is X?", intent);
            assert!(prompt.contains(NO_ANSWER));
            assert!(prompt.contains(instructions(intent)));
            assert!(prompt.contains("QUESTION: What is X?"));
        }
    }

    #[test]
    fn test_templates_are_distinct() {
        for a in Intent::ALL {
            for b in Intent::ALL {
                if a != b {
                    assert_ne!(instructions(a), instructions(b));
                }
            }
        }
    }

    #[test]
    fn test_rewrite_prompt_window() {
        let one = vec![Turn::new("q1", "a1")];
        let prompt = build_rewrite_prompt(&one, "and then?", Intent::General, 2);
        assert!(prompt.contains(NO_HISTORY));
        assert!(!prompt.contains("User: q1"));

        let three = vec![
            Turn::new("q1", "a1"),
            Turn::new("q2", "a2"),
            Turn::new("q3", "a3"),
        ];
        let prompt = build_rewrite_prompt(&three, "and then?", Intent::Procedure, 2);
        assert!(!prompt.contains("User: q1"));
        assert!(prompt.contains("User: q2\nAssistant: a2\nUser: q3\nAssistant: a3"));
        assert!(prompt.contains("Question type: procedure"));
    }

    #[test]
    fn test_sources_unique_and_bounded() {
        let chunks = vec![
            retrieved("a", "m.pdf", 1),
            retrieved("b", "m.pdf", 1),
            retrieved("c", "m.pdf", 2),
            retrieved("d", "n.pdf", 1),
            retrieved("e", "o.pdf", 9),
        ];
        assert_eq!(
            collect_sources(&chunks, 3),
            vec!["m.pdf (page 1)", "m.pdf (page 2)", "n.pdf (page 1)"]
        );
        assert!(collect_sources(&[], 3).is_empty());
    }
}
