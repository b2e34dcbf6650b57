//! Translation pipeline for CV content
//!
//! Translates a fixed whitelist of display-context fields through an
//! external text-generation service:
//!
//! 1. Serialize the whitelist into a plain JSON payload
//! 2. Send an instruction + payload to the service
//! 3. Extract JSON from the loosely-structured response (fence
//!    stripping, trailing-comma repair)
//! 4. Merge translated keys back over the original context
//!
//! Model output is not guaranteed well-formed; extraction failures are
//! reported, never allowed to escape as panics.

use crate::config::TranslationConfig;
use crate::cv::CvContext;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// System instruction sent with every translation request
const INSTRUCTIONS: &str = "You are a professional translator.";

/// Fallback used when a candidate has no bio to translate
const NO_BIO_FALLBACK: &str = "No bio information available.";

/// Trait for text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given instructions and prompt
    async fn generate(&self, instructions: &str, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat completions client
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
    timeout_ms: u64,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiGenerator {
    /// Create a generator from translation configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "translation.api_key is not configured".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            timeout_ms: config.timeout_secs * 1000,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Make request with retry
    async fn request_with_retry(&self, instructions: &str, prompt: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * (2_u64.pow(attempt)));
                tokio::time::sleep(delay).await;
            }

            match self.make_request(instructions, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Translation request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::TranslationError {
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn make_request(&self, instructions: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: instructions.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::TranslationTimeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    AppError::TranslationError {
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TranslationError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: ChatResponse = response.json().await.map_err(|e| AppError::TranslationError {
            message: format!("Failed to parse response: {}", e),
        })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::TranslationError {
                message: "Empty response from translation service".to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, instructions: &str, prompt: &str) -> Result<String> {
        self.request_with_retry(instructions, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap())
}

fn trailing_comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([\]}])").unwrap())
}

/// Extract a JSON value from loosely-structured model output
///
/// Strips a ```json ... ``` or ``` ... ``` fence when present (else the
/// whole text is the payload) and removes trailing commas immediately
/// before a closing bracket, then parses. Parse failure is an error,
/// not a panic.
pub fn extract_clean_json(text: &str) -> Result<Value> {
    let text = text.trim();

    let json_str = fence_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    let cleaned = trailing_comma_regex().replace_all(json_str, "$1");

    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::warn!(error = %e, payload = %cleaned, "Unparsable translation payload");
        AppError::TranslationError {
            message: format!("Unparsable translation payload: {}", e),
        }
    })
}

/// Serialize the translatable whitelist of a display context
///
/// UI labels, the bio (with its English fallback when absent), and the
/// project name/description pairs. Candidate identity, skill names, and
/// contact values are deliberately not part of the payload.
pub fn content_to_translate(ctx: &CvContext) -> Value {
    json!({
        "no_bio_message": ctx.labels.no_bio_message,
        "no_skills_message": ctx.labels.no_skills_message,
        "no_projects_message": ctx.labels.no_projects_message,
        "no_contacts_message": ctx.labels.no_contacts_message,
        "download_btn_title": ctx.labels.download_btn_title,
        "email_submit_btn_title": ctx.labels.email_submit_btn_title,
        "translate_btn_title": ctx.labels.translate_btn_title,
        "skills_title": ctx.labels.skills_title,
        "projects_title": ctx.labels.projects_title,
        "contacts_title": ctx.labels.contacts_title,
        "bio_title": ctx.labels.bio_title,
        "bio": ctx.bio.clone().unwrap_or_else(|| NO_BIO_FALLBACK.to_string()),
        "projects": ctx.projects.iter().map(|p| json!({
            "project_name": p.name,
            "project_description": p.description,
        })).collect::<Vec<_>>(),
    })
}

/// Overlay translated whitelist keys onto a display context
///
/// Keys absent from the response leave the original value unchanged;
/// keys outside the whitelist are ignored. Translated projects overlay
/// by index.
pub fn merge_translation(ctx: &mut CvContext, translated: &Value) {
    let Some(obj) = translated.as_object() else {
        return;
    };

    let overlay = |target: &mut String, key: &str| {
        if let Some(s) = obj.get(key).and_then(Value::as_str) {
            *target = s.to_string();
        }
    };

    overlay(&mut ctx.labels.no_bio_message, "no_bio_message");
    overlay(&mut ctx.labels.no_skills_message, "no_skills_message");
    overlay(&mut ctx.labels.no_projects_message, "no_projects_message");
    overlay(&mut ctx.labels.no_contacts_message, "no_contacts_message");
    overlay(&mut ctx.labels.download_btn_title, "download_btn_title");
    overlay(&mut ctx.labels.email_submit_btn_title, "email_submit_btn_title");
    overlay(&mut ctx.labels.translate_btn_title, "translate_btn_title");
    overlay(&mut ctx.labels.skills_title, "skills_title");
    overlay(&mut ctx.labels.projects_title, "projects_title");
    overlay(&mut ctx.labels.contacts_title, "contacts_title");
    overlay(&mut ctx.labels.bio_title, "bio_title");

    if ctx.bio.is_some() {
        if let Some(s) = obj.get("bio").and_then(Value::as_str) {
            ctx.bio = Some(s.to_string());
        }
    }

    if let Some(projects) = obj.get("projects").and_then(Value::as_array) {
        for (slot, item) in ctx.projects.iter_mut().zip(projects) {
            if let Some(name) = item.get("project_name").and_then(Value::as_str) {
                slot.name = name.to_string();
            }
            if let Some(description) = item.get("project_description").and_then(Value::as_str) {
                slot.description = description.to_string();
            }
        }
    }
}

/// The translation pipeline: serialize, request, extract, merge
pub struct TranslationPipeline {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl TranslationPipeline {
    /// Build the pipeline from configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let generator = OpenAiGenerator::from_config(config)?;
        let model = generator.model_name().to_string();

        Ok(Self {
            generator: Arc::new(generator),
            model,
        })
    }

    /// Build the pipeline around an existing generator
    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        let model = generator.model_name().to_string();
        Self { generator, model }
    }

    /// Translate a display context into the target language
    ///
    /// Returns a new context with the whitelisted fields translated.
    /// Any failure (network, HTTP, unparsable payload) is returned as a
    /// recoverable error; callers keep the untranslated context.
    pub async fn translate_context(
        &self,
        target_language: &str,
        ctx: &CvContext,
    ) -> Result<CvContext> {
        let payload = serde_json::to_string_pretty(&content_to_translate(ctx))?;

        let prompt = format!(
            "You are a professional translator.\n\
             Translate the following JSON to {}.\n\
             Return only valid JSON without comments or extra text.\n\n{}",
            target_language, payload
        );

        let started = std::time::Instant::now();
        let raw = self.generator.generate(INSTRUCTIONS, &prompt).await?;

        let parsed = extract_clean_json(&raw)?;

        crate::metrics::record_translation(
            started.elapsed().as_secs_f64(),
            &self.model,
            true,
        );

        let mut translated = ctx.clone();
        merge_translation(&mut translated, &parsed);

        tracing::info!(
            candidate_id = %ctx.candidate_id,
            language = target_language,
            "CV content translated"
        );

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use crate::cv::{CvContext, UiLabels};
    use crate::db::{CandidateSummary, ProjectSummary};
    use uuid::Uuid;

    fn context() -> CvContext {
        let summary = CandidateSummary {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            bio: Some("A seasoned software engineer.".to_string()),
            skills: vec!["Python".to_string(), "Rust".to_string()],
            projects: vec![ProjectSummary {
                name: "Test Project".to_string(),
                description: "A test project description.".to_string(),
            }],
            contacts: vec![],
        };
        let config = TranslationConfig {
            api_key: None,
            api_base: None,
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_retries: 1,
            languages: Vec::new(),
        };
        CvContext::build(summary, &config)
    }

    #[test]
    fn test_extract_fenced_with_trailing_comma() {
        let value = extract_clean_json("```json\n{\"a\": 1,}\n```").unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_extract_plain_fence() {
        let value = extract_clean_json("```\n{\"a\": [1, 2,],}\n```").unwrap();
        assert_eq!(value, serde_json::json!({"a": [1, 2]}));
    }

    #[test]
    fn test_extract_unfenced() {
        let value = extract_clean_json("{\"bio_title\": \"Biographie\"}").unwrap();
        assert_eq!(value["bio_title"], "Biographie");
    }

    #[test]
    fn test_extract_garbage_is_error() {
        let result = extract_clean_json("Sorry, I cannot translate that.");
        assert!(matches!(result, Err(AppError::TranslationError { .. })));
    }

    #[test]
    fn test_content_whitelist() {
        let ctx = context();
        let payload = content_to_translate(&ctx);

        assert_eq!(payload["bio"], "A seasoned software engineer.");
        assert_eq!(payload["skills_title"], "Skills");
        assert_eq!(payload["projects"][0]["project_name"], "Test Project");
        // identity and contacts never leave the service untranslated or not
        assert!(payload.get("first_name").is_none());
        assert!(payload.get("contacts").is_none());
    }

    #[test]
    fn test_content_bio_fallback() {
        let mut ctx = context();
        ctx.bio = None;
        let payload = content_to_translate(&ctx);
        assert_eq!(payload["bio"], NO_BIO_FALLBACK);
    }

    #[test]
    fn test_merge_overlays_whitelisted_keys() {
        let mut ctx = context();
        let translated = serde_json::json!({
            "bio_title": "Biographie",
            "bio": "Une ingénieure logicielle chevronnée.",
            "projects": [{
                "project_name": "Projet de Test",
                "project_description": "Une description de projet de test.",
            }],
            "first_name": "Jeanne",
        });

        merge_translation(&mut ctx, &translated);

        assert_eq!(ctx.labels.bio_title, "Biographie");
        assert_eq!(ctx.bio.as_deref(), Some("Une ingénieure logicielle chevronnée."));
        assert_eq!(ctx.projects[0].name, "Projet de Test");
        // absent keys unchanged
        assert_eq!(ctx.labels.skills_title, "Skills");
        // non-whitelisted keys ignored
        assert_eq!(ctx.first_name, "Jane");
    }

    #[test]
    fn test_merge_missing_bio_stays_missing() {
        let mut ctx = context();
        ctx.bio = None;
        merge_translation(&mut ctx, &serde_json::json!({"bio": "translated fallback"}));
        assert!(ctx.bio.is_none());
    }

    #[test]
    fn test_merge_non_object_is_noop() {
        let mut ctx = context();
        let labels = UiLabels::default();
        merge_translation(&mut ctx, &serde_json::json!(["not", "an", "object"]));
        assert_eq!(ctx.labels, labels);
    }

    struct CannedGenerator {
        response: String,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String> {
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String> {
            Err(AppError::TranslationError {
                message: "connection refused".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end() {
        let generator = Arc::new(CannedGenerator {
            response: "```json\n{\"skills_title\": \"Compétences\",}\n```".to_string(),
        });
        let pipeline = TranslationPipeline::with_generator(generator);

        let ctx = context();
        let translated = pipeline.translate_context("French", &ctx).await.unwrap();

        assert_eq!(translated.labels.skills_title, "Compétences");
        assert_eq!(translated.labels.bio_title, "Bio");
        // the input context is untouched
        assert_eq!(ctx.labels.skills_title, "Skills");
    }

    #[tokio::test]
    async fn test_pipeline_service_failure_is_recoverable() {
        let pipeline = TranslationPipeline::with_generator(Arc::new(FailingGenerator));
        let ctx = context();

        let err = pipeline.translate_context("French", &ctx).await.unwrap_err();
        assert!(err.is_translation_failure());
    }
}
