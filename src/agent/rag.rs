//! Retrieval branch: retrieve passages, build context, generate an answer

use crate::agent::{AgentOutcome, Source};
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::retrieval::{Passage, Retriever};

/// Fixed reply when retrieval finds nothing or the context has no answer
pub const NO_ANSWER: &str = "The documents do not provide a clear answer.";

fn rag_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a precise extraction assistant. Answer the user's question using \
         ONLY the text provided in the Context section below.\n\n\
         RULES:\n\
         1. Do NOT use outside knowledge.\n\
         2. If the answer is not in the Context, strictly output: \"{NO_ANSWER}\"\n\
         3. Answer directly and naturally. Do NOT start with \"In this document\" \
         or \"According to the document\".\n\
         4. If the context contains multiple relevant points, summarize them clearly.\n\n\
         Context:\n{context}\n\n\
         Question:\n{question}"
    )
}

/// Strip layout noise from a retrieved chunk: page numbers and stray short
/// lines left over from document extraction.
fn clean_chunk(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| line.len() >= 5 && !line.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| clean_chunk(&p.content))
        .filter(|cleaned| !cleaned.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn run(
    llm: &dyn LanguageModel,
    retriever: &dyn Retriever,
    query: &str,
) -> Result<AgentOutcome> {
    let passages = retriever.retrieve(query).await?;

    if passages.is_empty() {
        return Ok(AgentOutcome {
            answer: NO_ANSWER.to_string(),
            source: Source::Rag,
            passages,
        });
    }

    let context = build_context(&passages);
    let answer = llm.complete(&rag_prompt(&context, query)).await?;

    Ok(AgentOutcome {
        answer: answer.trim().to_string(),
        source: Source::Rag,
        passages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_chunk_drops_page_numbers_and_short_lines() {
        let raw = "42\nHybrid retrieval combines two signals.\nok\n7\nReranking refines the order.";
        let cleaned = clean_chunk(raw);

        assert_eq!(
            cleaned,
            "Hybrid retrieval combines two signals. Reranking refines the order."
        );
    }

    #[test]
    fn context_joins_cleaned_passages() {
        let passages = vec![
            Passage::new("First passage body here."),
            Passage::new("12\n3"),
            Passage::new("Second passage body here."),
        ];

        let context = build_context(&passages);

        assert_eq!(
            context,
            "First passage body here.\n\nSecond passage body here."
        );
    }

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = rag_prompt("Some context block.", "What is this?");
        assert!(prompt.contains("Some context block."));
        assert!(prompt.contains("What is this?"));
        assert!(prompt.contains(NO_ANSWER));
    }
}
