//! Reply composition: generated body plus a citation of the matched document.

use crate::config::ResponderSettings;
use crate::llm::{LlmError, TextGenerator};

/// A reply ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Human-readable title for a document id: `install-guide` → `Install Guide`.
///
/// Every letter that follows a non-letter is upper-cased and every other
/// letter lower-cased.
pub fn display_title(document_id: &str) -> String {
    let spaced = document_id.replace(['-', '_'], " ");
    let mut title = String::with_capacity(spaced.len());
    let mut previous_is_letter = false;

    for c in spaced.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            title.push(c);
            previous_is_letter = false;
        }
    }

    title
}

/// Prompt asking for a helpful, non-promotional comment on `post_title`.
pub fn build_prompt(post_title: &str, document_excerpt: &str) -> String {
    format!(
        r#"A Reddit user has created a post titled: "{post_title}".

Based on the following article text, write a helpful and insightful comment that adds value to the discussion.
The comment should be written in a conversational, friendly tone, as if a real person is helping out.
Do NOT sound like a marketing bot. Be genuinely helpful.
Start the comment naturally without introducing yourself or the article.

Article text:
---
{document_excerpt}
---

Generate only the comment text."#
    )
}

/// The citation block appended after the generated text.
pub fn citation(document_id: &str, base_url: &str) -> String {
    format!(
        "---\n*For more details, you can check out this guide: [{}]({}{})*",
        display_title(document_id),
        base_url,
        document_id
    )
}

/// Generate a reply for `post_title` grounded in the given document.
pub async fn compose(
    post_title: &str,
    document_id: &str,
    document_text: &str,
    generator: &dyn TextGenerator,
    settings: &ResponderSettings,
) -> Result<Message, LlmError> {
    let prompt = build_prompt(post_title, excerpt(document_text, settings.excerpt_chars));

    tracing::info!(document = document_id, "Generating reply");
    let generated = generator.generate(&prompt).await.map_err(|e| {
        tracing::warn!("Error generating reply: {}", e);
        e
    })?;

    let text = generated.trim();
    if text.is_empty() {
        tracing::warn!("Generator returned only whitespace");
        return Err(LlmError::parse_error("empty generated text".to_string()));
    }

    Ok(Message {
        body: format!(
            "{}\n\n{}",
            text,
            citation(document_id, &settings.base_url)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedGenerator {
        reply: Result<String, LlmError>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(reply: Result<String, LlmError>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn settings(excerpt_chars: usize) -> ResponderSettings {
        ResponderSettings {
            base_url: "https://blog.example.com/posts/".into(),
            excerpt_chars,
        }
    }

    #[test]
    fn test_display_title() {
        assert_eq!(display_title("install-guide"), "Install Guide");
        assert_eq!(display_title("python_3-TIPS"), "Python 3 Tips");
        assert_eq!(display_title("what's-new"), "What'S New");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 100), "short");
        assert_eq!(excerpt("", 10), "");
    }

    #[test]
    fn test_prompt_mentions_title_and_excerpt() {
        let prompt = build_prompt("How do I install Python?", "Step one: download.");
        assert!(prompt.contains("\"How do I install Python?\""));
        assert!(prompt.contains("---\nStep one: download.\n---"));
        assert!(prompt.contains("Do NOT sound like a marketing bot"));
        assert!(prompt.contains("without introducing yourself"));
    }

    #[tokio::test]
    async fn test_compose_appends_citation() {
        let generator = CannedGenerator::new(Ok("  Try a virtualenv first.\n".into()));
        let message = compose(
            "venv trouble",
            "python-venv-guide",
            "Virtual environments isolate packages.",
            &generator,
            &settings(4000),
        )
        .await
        .unwrap();

        assert_eq!(
            message.body,
            "Try a virtualenv first.\n\n---\n*For more details, you can check out this guide: \
             [Python Venv Guide](https://blog.example.com/posts/python-venv-guide)*"
        );
    }

    #[tokio::test]
    async fn test_compose_sends_truncated_excerpt() {
        let generator = CannedGenerator::new(Ok("ok".into()));
        let text = "a".repeat(50) + "TRUNCATED-TAIL";
        compose("t", "doc", &text, &generator, &settings(50))
            .await
            .unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(&"a".repeat(50)));
        assert!(!prompts[0].contains("TRUNCATED-TAIL"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_returned() {
        let generator = CannedGenerator::new(Err(LlmError::network_error("down".into())));
        let err = compose("t", "doc", "text", &generator, &settings(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Network);
    }

    #[tokio::test]
    async fn test_blank_generation_is_a_failure() {
        let generator = CannedGenerator::new(Ok(" \n\t ".into()));
        let err = compose("t", "doc", "text", &generator, &settings(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Parse);
    }
}
