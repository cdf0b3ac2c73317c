//! Lesson generation through the Gemini `generateContent` REST endpoint.
//!
//! Request and response shapes are always compiled so the parsing path can
//! be tested offline. The HTTP client only exists with the `network` feature.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::content::ContentError;
use crate::error::DrillError;
use crate::lesson::Lesson;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SYSTEM_PROMPT: &str = "You are a European Portuguese (PT-PT) tutor for Chinese-speaking beginners.

Rules:
1. Strict PT-PT, never Brazilian Portuguese.
   - 'Tu' is the default casual 'you'.
   - Continuous tense uses 'a + infinitive' ('estou a falar', not 'estou falando').
   - Prefer Comboio over Trem, Autocarro over Ônibus, Telemóvel over Celular, Casa de banho over Banheiro, Sumo over Suco.
2. Content feeds a drill sequence: intro, pairing, sentence scramble, choice, quiz.
3. Friendly tone, precise about Portugal's standard.
4. All explanations in simplified Chinese.

Reply with strict JSON matching the response schema.";

const SENTENCE_RULES: &str = "Sentence rules:
1. Only use \"Tu\" for casual singular \"you\".
2. Dialogue sentences are 3 to 6 words long.
3. Include everyday PT-PT vocabulary (Comboio, Telemóvel, ...).
4. No Brazilian forms: no default \"Você\", no gerunds like \"falando\".";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

fn lesson_schema() -> Value {
    let string = json!({ "type": "STRING" });
    json!({
        "type": "OBJECT",
        "properties": {
            "id": string,
            "title": string,
            "chineseTitle": string,
            "situation": string,
            "dialogue": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "speaker": string, "text": string, "translation": string }
                }
            },
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "pt": string, "cn": string }
                }
            },
            "grammar": {
                "type": "OBJECT",
                "properties": { "point": string, "explanation": string, "example": string }
            },
            "quiz": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": string,
                        "options": { "type": "ARRAY", "items": string },
                        "correctIndex": { "type": "INTEGER" },
                        "explanation": string
                    }
                }
            },
            "challenge": string
        }
    })
}

pub fn build_request(topic: &str) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content::text(SYSTEM_PROMPT),
        contents: vec![Content::text(format!(
            "Generate a strict European Portuguese (PT-PT) lesson for Chinese beginners: {topic}.\n{SENTENCE_RULES}"
        ))],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: lesson_schema(),
        },
    }
}

/// Pull the lesson JSON out of a `generateContent` response body.
pub fn parse_generate_response(body: &str) -> Result<Lesson, ContentError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| DrillError::malformed(format!("unreadable response: {e}")))?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
        .ok_or(ContentError::EmptyResponse)?;

    Ok(Lesson::from_json(strip_code_fence(&text))?)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(feature = "network")]
pub struct GeminiSource {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[cfg(feature = "network")]
impl GeminiSource {
    pub fn new(api_key: String, model: &str) -> Result<Self, ContentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ContentError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Read the API key from `key_env`.
    pub fn from_env(key_env: &str, model: &str) -> Result<Self, ContentError> {
        let api_key = std::env::var(key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ContentError::MissingApiKey(key_env.to_string()))?;
        Self::new(api_key, model)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(feature = "network")]
impl super::ContentSource for GeminiSource {
    fn fetch_lesson(&self, topic: &str) -> Result<Lesson, ContentError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = serde_json::to_string(&build_request(topic))
            .map_err(|e| ContentError::Network(e.to_string()))?;

        tracing::debug!(model = %self.model, topic, "requesting lesson");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| ContentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::HttpStatus(status.as_u16()));
        }
        let text = response
            .text()
            .map_err(|e| ContentError::Network(e.to_string()))?;
        parse_generate_response(&text)
    }
}
