//! cvsearch LLM - Resume structuring
//!
//! Turns extracted resume text into the model's JSON description of the
//! candidate. The raw reply is returned verbatim; [`parse_profile`] is a
//! best-effort reader used only to enrich the stored payload.

pub mod client;
pub mod prompts;

pub use client::{create_llm_client, OllamaClient, OpenAiCompatibleClient};

use cvsearch_core::{LlmClient, ResumeProfile, Result};
use std::sync::Arc;

/// Sends resume text to the language model with the fixed extraction prompt
pub struct ResumeStructurer {
    llm: Arc<dyn LlmClient>,
}

impl ResumeStructurer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Ask the model to describe the candidate; returns its reply unchanged
    pub async fn structure(&self, text: &str) -> Result<String> {
        tracing::debug!(
            model = self.llm.model(),
            chars = text.len(),
            "Structuring resume text"
        );
        self.llm.chat(prompts::RESUME_EXTRACTION_PROMPT, text).await
    }
}

/// Strip a surrounding Markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Read the model reply as a [`ResumeProfile`] when it is a JSON object
pub fn parse_profile(raw: &str) -> Option<ResumeProfile> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw)).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingLlm {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn chat(&self, system: &str, user: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok("not json at all".to_string())
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_structure_returns_reply_verbatim() {
        let llm = Arc::new(RecordingLlm {
            calls: Mutex::new(Vec::new()),
        });
        let structurer = ResumeStructurer::new(llm.clone());

        let reply = structurer.structure("John Doe, Software Engineer").await.unwrap();
        assert_eq!(reply, "not json at all");

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, prompts::RESUME_EXTRACTION_PROMPT);
        assert_eq!(calls[0].1, "John Doe, Software Engineer");
    }

    #[test]
    fn test_parse_profile_plain_json() {
        let profile = parse_profile(
            r#"{"name": "John Doe", "role": "Software Engineer", "skills": ["Python", "Go"], "age": null}"#,
        )
        .unwrap();
        assert_eq!(profile.name.as_deref(), Some("John Doe"));
        assert_eq!(profile.skills, vec!["Python", "Go"]);
        assert!(profile.age.is_none());
    }

    #[test]
    fn test_parse_profile_fenced_json() {
        let raw = "```json\n{\"name\": \"Jane Roe\", \"languages\": [\"English\"]}\n```";
        let profile = parse_profile(raw).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Jane Roe"));
        assert_eq!(profile.languages, vec!["English"]);
    }

    #[test]
    fn test_parse_profile_rejects_non_objects() {
        assert!(parse_profile("Here is the JSON you asked for").is_none());
        assert!(parse_profile("[1, 2, 3]").is_none());
        assert!(parse_profile("response: {\"name\": \"x\"}").is_none());
    }

    #[test]
    fn test_parse_profile_keeps_object_with_null_fields() {
        let raw = r#"{"name": "John Doe", "age": null, "role": "Software Engineer",
            "skills": ["Python", "Go"], "experience": null, "projects": null,
            "education": null, "certifications": null, "languages": null,
            "location": null, "contact_info": null}"#;

        let profile = parse_profile(raw).unwrap();
        assert_eq!(profile.name.as_deref(), Some("John Doe"));
        assert_eq!(profile.skills, vec!["Python", "Go"]);
        assert!(profile.languages.is_empty());
    }

    #[test]
    fn test_parse_profile_keeps_structured_languages() {
        let raw = r#"{"name": "Jane Roe",
            "languages": [{"language": "English", "proficiency": "Fluent"}, "Spanish"]}"#;

        let profile = parse_profile(raw).unwrap();
        assert_eq!(profile.languages.len(), 2);
        assert_eq!(profile.languages[0]["proficiency"], "Fluent");
        assert_eq!(profile.languages[1], "Spanish");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
