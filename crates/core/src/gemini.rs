use crate::config::Config;
use crate::error::{AppError, Result};
use crate::image_loader::EncodedImage;
use crate::metadata::{GeneratedMetadata, STOCK_PROMPT, parse_reply, response_schema};
use async_trait::async_trait;
use gemini_rust::{Blob, Content, Gemini, Message, Part, Role};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Anything that can turn an encoded photo into stock metadata.
///
/// The desktop app and the headless mode talk to Gemini through this seam;
/// tests substitute a scripted implementation.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn generate(&self, image: &EncodedImage) -> Result<GeneratedMetadata>;
}

pub struct GeminiClient {
    client: Gemini,
    model_name: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(AppError::config(
                "No Gemini API key configured. Set GEMINI_API_KEY or add a key in Settings.",
            ));
        }

        // Explicitly set the base URL to avoid a BadScheme error
        let base_url = url::Url::parse(BASE_URL)
            .map_err(|e| AppError::Config(format!("Invalid base URL: {}", e)))?;

        let model_name = config.qualified_model_name();
        let model_url = format!("{}{}", BASE_URL, model_name);

        let client = Gemini::with_model_and_base_url(&config.gemini_api_key, model_url, base_url)
            .map_err(|e| AppError::Config(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self { client, model_name })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl MetadataService for GeminiClient {
    /// Sends the image with the stock prompt and parses the structured reply.
    async fn generate(&self, image: &EncodedImage) -> Result<GeneratedMetadata> {
        let blob = Blob {
            mime_type: image.mime_type().to_string(),
            data: image.payload().to_string(),
        };

        let text_part = Part::Text {
            text: STOCK_PROMPT.to_string(),
            thought: None,
            thought_signature: None,
        };
        let image_part = Part::InlineData { inline_data: blob };

        let message = Message {
            role: Role::User,
            content: Content {
                role: Some(Role::User),
                parts: Some(vec![text_part, image_part]),
            },
        };

        tracing::info!(
            model = %self.model_name,
            mime_type = image.mime_type(),
            bytes = image.byte_len(),
            "requesting stock metadata"
        );

        let response = self
            .client
            .generate_content()
            .with_messages(vec![message])
            .with_response_mime_type("application/json")
            .with_response_schema(response_schema())
            .execute()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Gemini request failed");
                AppError::generation(format!("Request to Gemini failed: {}", e))
            })?;

        let text = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.as_deref())
            .and_then(collect_text);

        let metadata = parse_reply(text.as_deref())?;
        tracing::info!(
            keywords = metadata.keywords.len(),
            description_chars = metadata.description_len(),
            "stock metadata received"
        );
        Ok(metadata)
    }
}

/// Concatenates the answer text of a candidate, skipping thought parts.
fn collect_text(parts: &[Part]) -> Option<String> {
    let text: String = parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text, thought, .. } if !thought.unwrap_or(false) => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_part(text: &str, thought: Option<bool>) -> Part {
        Part::Text {
            text: text.to_string(),
            thought,
            thought_signature: None,
        }
    }

    #[test]
    fn collects_answer_text_across_parts() {
        let parts = vec![
            text_part("{\"title\":\"T\",", None),
            text_part("weighing keywords", Some(true)),
            text_part("\"description\":\"D\",\"keywords\":[]}", Some(false)),
        ];
        assert_eq!(
            collect_text(&parts).as_deref(),
            Some("{\"title\":\"T\",\"description\":\"D\",\"keywords\":[]}")
        );
    }

    #[test]
    fn no_text_parts_means_no_reply() {
        assert_eq!(collect_text(&[]), None);
        assert_eq!(collect_text(&[text_part("only thinking", Some(true))]), None);
    }

    #[test]
    fn client_requires_api_key() {
        let config = Config::from_lookup(|_| None, false).unwrap();
        assert!(matches!(GeminiClient::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn client_uses_qualified_model_name() {
        let config = Config::builder()
            .with_api_key("test-key")
            .with_model("gemini-2.5-flash")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.model_name(), "models/gemini-2.5-flash");
    }
}
