//! Stock metadata model and the fixed request contract.
//!
//! The prompt and JSON schema sent to the model live here together with the
//! parser for its reply, so the shape requested and the shape accepted
//! cannot drift apart.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Character budget requested for descriptions. Not enforced locally.
pub const DESCRIPTION_LIMIT: usize = 1000;

/// Message surfaced when the model returns no text at all.
pub const NO_RESPONSE_MESSAGE: &str = "No response received from the AI.";

/// Separator used when copying the keyword list.
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Instruction sent alongside every image.
pub const STOCK_PROMPT: &str = "Act as a world-class stock photography metadata specialist. Analyze the provided image and generate:
1. A concise, descriptive, and SEO-friendly Title (Caption).
2. A detailed Description (maximum 1000 characters) that includes the mood, lighting, colors, and subject matter, suitable for a professional stock contributor profile.
3. A comprehensive list of at least 30-50 relevant keywords that would help this photo rank high in search results.

IMPORTANT: The response MUST be in English. The description MUST be under 1000 characters.";

/// Title, description and keywords produced for one photo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMetadata {
    pub title: String,
    pub description: String,
    /// Ordered by relevance, as returned by the model.
    pub keywords: Vec<String>,
}

/// Which part of the metadata a copy action targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    Title,
    Description,
    Keywords,
}

impl GeneratedMetadata {
    /// Keywords joined for pasting into a marketplace form.
    pub fn keywords_text(&self) -> String {
        self.keywords.join(KEYWORD_SEPARATOR)
    }

    /// Description length in characters (not bytes).
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }

    pub fn description_exceeds_limit(&self) -> bool {
        self.description_len() > DESCRIPTION_LIMIT
    }

    /// Text placed on the clipboard for the given target.
    pub fn copy_text(&self, target: CopyTarget) -> String {
        match target {
            CopyTarget::Title => self.title.clone(),
            CopyTarget::Description => self.description.clone(),
            CopyTarget::Keywords => self.keywords_text(),
        }
    }
}

/// JSON schema handed to the model as its response contract.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A catchy SEO title for the photo"
            },
            "description": {
                "type": "STRING",
                "description": "A detailed description under 1000 characters"
            },
            "keywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of 30-50 relevant search keywords"
            }
        },
        "required": ["title", "description", "keywords"]
    })
}

/// Parses the model's text reply into metadata.
///
/// A missing or blank reply yields [`NO_RESPONSE_MESSAGE`]; anything that is
/// not the declared shape is a generation failure as well.
pub fn parse_reply(text: Option<&str>) -> Result<GeneratedMetadata> {
    let text = match text.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(AppError::generation(NO_RESPONSE_MESSAGE)),
    };

    serde_json::from_str(text)
        .map_err(|e| AppError::generation(format!("The AI returned malformed metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeneratedMetadata {
        GeneratedMetadata {
            title: "T".to_string(),
            description: "D".to_string(),
            keywords: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn parses_well_formed_reply() {
        let parsed = parse_reply(Some(r#"{"title":"T","description":"D","keywords":["a","b"]}"#)).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn missing_or_blank_reply_reports_no_response() {
        for reply in [None, Some(""), Some("  \n")] {
            let err = parse_reply(reply).unwrap_err();
            assert_eq!(err.to_string(), NO_RESPONSE_MESSAGE);
        }
    }

    #[test]
    fn malformed_reply_is_a_generation_failure() {
        let err = parse_reply(Some("Sure! Here is your metadata:")).unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(_)));

        let err = parse_reply(Some(r#"{"title":"T","description":"D"}"#)).unwrap_err();
        assert!(err.to_string().contains("keywords"));
    }

    #[test]
    fn keywords_join_with_comma_space() {
        assert_eq!(sample().keywords_text(), "a, b");
        assert_eq!(sample().copy_text(CopyTarget::Keywords), "a, b");

        let single = GeneratedMetadata {
            keywords: vec!["sunset".to_string()],
            ..sample()
        };
        assert_eq!(single.keywords_text(), "sunset");
    }

    #[test]
    fn description_length_counts_characters() {
        let mut metadata = sample();
        metadata.description = "é".repeat(DESCRIPTION_LIMIT);
        assert_eq!(metadata.description_len(), DESCRIPTION_LIMIT);
        assert!(!metadata.description_exceeds_limit());

        metadata.description.push('x');
        assert!(metadata.description_exceeds_limit());
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["title", "description", "keywords"]));
        assert_eq!(schema["properties"]["keywords"]["items"]["type"], "STRING");
    }

    #[test]
    fn prompt_states_the_description_cap() {
        assert!(STOCK_PROMPT.contains("maximum 1000 characters"));
        assert!(STOCK_PROMPT.contains("30-50"));
    }
}
