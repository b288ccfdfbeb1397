//! OpenAI-compatible classifier.

use crate::config::OpenAiClassifierConfig;
use crate::dto::{ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;
use bluejay_core::{Classification, ClassificationRequest};
use bluejay_error::{ClassifierError, ClassifierErrorKind, ConfigError};
use bluejay_interface::Classifier;
use bluejay_rate_limit::RetryPolicy;
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Classifier backed by `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClassifier {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    system_prompt: String,
    retry: RetryPolicy,
}

impl OpenAiClassifier {
    /// Build a classifier, reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if:
    /// - The API key variable is not set
    /// - The system prompt file cannot be read
    #[instrument(skip_all, fields(model = %config.model()))]
    pub fn new(config: &OpenAiClassifierConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a classifier with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the system prompt file cannot be read.
    pub fn with_api_key(
        config: &OpenAiClassifierConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let retry = config.retry_policy();
        let client = Client::builder()
            .timeout(*retry.total_timeout())
            .build()
            .map_err(|e| ConfigError::new(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", config.base_url().trim_end_matches('/')),
            model: config.model().clone(),
            temperature: *config.temperature(),
            system_prompt: config.system_prompt()?,
            retry,
        })
    }

    fn chat_request(&self, request: &ClassificationRequest) -> ChatRequest {
        let payload = serde_json::json!({
            "post_text": request.post_text(),
            "author": request.author(),
            "nsfw_allowed": request.nsfw_allowed(),
            "target_lang": request.target_lang(),
            "persona": request.persona(),
            "thread_context": request.thread_context(),
        });
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(payload.to_string()),
            ],
            temperature: self.temperature,
            max_tokens: 180,
        }
    }

    /// One round trip, without retries.
    async fn complete(&self, chat: &ChatRequest) -> Result<Classification, ClassifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(chat)
            .send()
            .await
            .map_err(|e| {
                ClassifierError::new(ClassifierErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifierError::new(ClassifierErrorKind::Api { status, message }));
        }

        let body: ChatResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Unreadable completion body, not replying");
                return Ok(Classification::skip());
            }
        };

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(parse_classification(&content))
    }
}

/// Parse assistant output as `{should_reply, reply}`.
///
/// Anything that is not that JSON object (optionally inside a code fence)
/// becomes [`Classification::skip`].
///
/// # Examples
///
/// ```
/// use bluejay_models::parse_classification;
///
/// let c = parse_classification(r#"{"should_reply": true, "reply": "hi"}"#);
/// assert_eq!(c.reply_text(), Some("hi"));
/// assert!(!parse_classification("sure, I'd reply with hi").should_reply);
/// ```
pub fn parse_classification(content: &str) -> Classification {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<Classification>(unfenced) {
        Ok(classification) => classification,
        Err(e) => {
            debug!(error = %e, "Malformed classifier output");
            Classification::skip()
        }
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    #[instrument(skip_all, fields(author = %request.author(), model = %self.model))]
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, ClassifierError> {
        let chat = self.chat_request(request);
        let classification = self.retry.run(|| self.complete(&chat)).await?;
        debug!(should_reply = classification.should_reply, "Classified");
        Ok(classification)
    }
}
