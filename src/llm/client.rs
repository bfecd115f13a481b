// file: src/llm/client.rs
// description: Groq API chat client implementing the OCR, fixer, and extractor capabilities
// reference: https://console.groq.com/docs/text-chat

use crate::config::LlmConfig;
use crate::error::{PipelineError, Result};
use crate::llm::{ProfileExtractor, TextFixer, VisionOcr};
use crate::models::CandidateAnalysis;
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const FIX_PROMPT: &str = "You repair resume text damaged by OCR and PDF extraction. \
Fix broken line wraps, garbled characters, and encoding noise. Preserve the original \
wording, ordering, and every factual detail. Reply with the repaired text only.";

const OCR_PROMPT: &str = "Transcribe all text visible in this resume document image. \
Preserve reading order. Reply with the transcribed text only.";

const EXTRACT_PROMPT: &str = r#"You analyze hospitality-sector resumes. Extract a candidate profile from the resume text and reply with a single JSON object matching exactly this shape (no markdown, no commentary):
{
  "candidate_name": "full name",
  "age": 30,
  "experience_level": "Entry Level" | "Mid-Level" | "Senior" | "Management",
  "primary_department": "best-fit department",
  "scores": {"department_match": 0-100, "technical_qualification": 0-100, "experience_value": 0-100, "language_proficiency": 0-100, "practical_factors": 0-100},
  "department_scores": [{"category": "Guest Services" | "Accommodation Services" | "Food & Beverage" | "Business Operations" | "Facilities Management", "department": "name", "score": 0-100}],
  "role_skills": {"customer_facing": [{"name": "...", "level": 1-5}], "operational": [...], "administrative": [...]},
  "languages": [{"language": "...", "level": 1-5}],
  "education": ["one line per entry"],
  "experience": ["one line per entry"],
  "certifications": [{"name": "...", "issuer": "...", "expires": "YYYY-MM-DD or null"}],
  "personal": {"availability": "...", "accommodation_needs": null, "salary_expectation": 32000, "notice_period": "..."},
  "recommended_positions": [{"title": "...", "department": "...", "match_score": 0-100}],
  "demographics": {"first_name": "...", "last_name": "...", "email": null, "phone": null, "birthdate": null, "gender": null}
}
Use null for unknown optional values and [] for empty lists. salary_expectation is a plain yearly number or null."#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat-completions client for an OpenAI-compatible endpoint. One client
/// serves all three capability seams; the vision model is only used for OCR.
pub struct GroqChatClient {
    client: Client,
    config: LlmConfig,
}

impl GroqChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn chat(&self, model: &str, messages: Vec<serde_json::Value>) -> Result<String> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            PipelineError::Capability("no API key configured (set TALENT_SCAN_LLM__API_KEY)".to_string())
        })?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Capability(format!("failed to send chat request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Capability(format!(
                "chat request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Capability(format!("failed to parse chat response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::Capability("chat response contained no choices".to_string()))?;

        debug!("Received {} chars from model {}", content.len(), model);
        Ok(content)
    }
}

/// Pull the first JSON object out of model output, tolerating markdown
/// fences and prose around it.
pub(crate) fn extract_json_object(content: &str) -> Result<&str> {
    let start = content
        .find('{')
        .ok_or_else(|| PipelineError::Extraction("no JSON object in model output".to_string()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| PipelineError::Extraction("unterminated JSON object in model output".to_string()))?;
    if end < start {
        return Err(PipelineError::Extraction(
            "malformed JSON object in model output".to_string(),
        ));
    }
    Ok(&content[start..=end])
}

#[async_trait]
impl VisionOcr for GroqChatClient {
    async fn ocr_image(&self, bytes: &[u8], mime: &str) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_url = format!("data:{};base64,{}", mime, encoded);

        debug!("Requesting OCR for {} byte {} image", bytes.len(), mime);

        let messages = vec![json!({
            "role": "user",
            "content": [
                {"type": "text", "text": OCR_PROMPT},
                {"type": "image_url", "image_url": {"url": data_url}}
            ]
        })];

        let text = self.chat(&self.config.vision_model, messages).await?;
        if text.trim().is_empty() {
            return Err(PipelineError::Acquisition(
                "OCR returned empty text".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextFixer for GroqChatClient {
    async fn fix_text(&self, text: &str) -> Result<String> {
        let messages = vec![
            json!({"role": "system", "content": FIX_PROMPT}),
            json!({"role": "user", "content": text}),
        ];

        let fixed = self
            .chat(&self.config.chat_model, messages)
            .await
            .map_err(|e| PipelineError::Normalization(e.to_string()))?;

        if fixed.trim().is_empty() {
            return Err(PipelineError::Normalization(
                "fixer returned empty text".to_string(),
            ));
        }
        Ok(fixed)
    }
}

#[async_trait]
impl ProfileExtractor for GroqChatClient {
    async fn extract_profile(&self, text: &str) -> Result<CandidateAnalysis> {
        let messages = vec![
            json!({"role": "system", "content": EXTRACT_PROMPT}),
            json!({"role": "user", "content": text}),
        ];

        let content = self
            .chat(&self.config.chat_model, messages)
            .await
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;

        let object = extract_json_object(&content)?;
        let analysis: CandidateAnalysis = serde_json::from_str(object)
            .map_err(|e| PipelineError::Extraction(format!("model output did not match schema: {}", e)))?;

        analysis.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_plain() {
        let content = r#"{"candidate_name": "A"}"#;
        assert_eq!(extract_json_object(content).unwrap(), content);
    }

    #[test]
    fn test_extract_json_object_fenced() {
        let content = "Here is the profile:\n```json\n{\"candidate_name\": \"A\"}\n```\nDone.";
        assert_eq!(
            extract_json_object(content).unwrap(),
            "{\"candidate_name\": \"A\"}"
        );
    }

    #[test]
    fn test_extract_json_object_missing() {
        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[tokio::test]
    async fn test_chat_without_api_key_fails() {
        let client = GroqChatClient::new(crate::config::Config::default_config().llm);
        let err = client.fix_text("some text").await.unwrap_err();
        assert!(matches!(err, PipelineError::Normalization(_)));
    }
}
