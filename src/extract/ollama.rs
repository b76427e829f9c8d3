use serde::{Deserialize, Serialize};

use super::ExtractError;

/// Client seam for the vision LLM. The orchestrator only ever talks to
/// this trait; production uses [`OllamaClient`], tests use [`MockVisionClient`].
pub trait VisionClient: Send + Sync {
    /// Send a chat turn with optional base64 images and return the
    /// model's text reply.
    fn chat_with_images(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, ExtractError>;

    /// Names of models available on the backend.
    fn list_models(&self) -> Result<Vec<String>, ExtractError>;
}

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance with a 5-minute timeout — vision models on
    /// CPU can take minutes for a multi-page Casting-Bogen.
    pub fn default_local() -> Self {
        Self::new(crate::config::DEFAULT_OLLAMA_URL, 300)
    }

    /// Check that the given model is pulled on the backend.
    pub fn is_model_available(&self, model: &str) -> Result<bool, ExtractError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExtractError {
        if e.is_connect() {
            ExtractError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            ExtractError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            ExtractError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

impl VisionClient for OllamaClient {
    fn chat_with_images(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, ExtractError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images: if images.is_empty() {
                    None
                } else {
                    Some(images)
                },
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::OllamaApi {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ExtractError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::OllamaApi {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| ExtractError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock vision client for testing — returns a configurable response and
/// records what it was asked.
pub struct MockVisionClient {
    response: String,
    available_models: Vec<String>,
    pub calls: std::sync::Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub image_count: usize,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            available_models: vec![crate::config::DEFAULT_VISION_MODEL.to_string()],
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl VisionClient for MockVisionClient {
    fn chat_with_images(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, ExtractError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            image_count: images.len(),
        });
        Ok(self.response.clone())
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractError> {
        Ok(self.available_models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockVisionClient::new("## FAMILIE WEBER AUS KÖLN");
        let result = client.chat_with_images("model", "prompt", &[]).unwrap();
        assert_eq!(result, "## FAMILIE WEBER AUS KÖLN");
    }

    #[test]
    fn mock_client_records_calls() {
        let client = MockVisionClient::new("ok");
        client
            .chat_with_images("m1", "analyze this", &["aW1n".into()])
            .unwrap();

        let call = client.last_call().unwrap();
        assert_eq!(call.model, "m1");
        assert_eq!(call.image_count, 1);
        assert!(call.prompt.contains("analyze"));
    }

    #[test]
    fn mock_client_lists_models() {
        let client =
            MockVisionClient::new("").with_models(vec!["qwen2.5vl:7b".into(), "llava:13b".into()]);
        let models = client.list_models().unwrap();
        assert_eq!(models.len(), 2);
    }

    #[test]
    fn ollama_client_constructor() {
        let client = OllamaClient::new("http://localhost:11434", 120);
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 120);
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60);
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn chat_request_omits_empty_images() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
                images: None,
            }],
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("images"));
    }
}
