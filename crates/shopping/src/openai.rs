//! OpenAI-compatible chat completion classifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::classifier::{CategorizationAttempt, Classifier, parse_classification_response};
use crate::error::ClassificationError;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that categorizes ingredients into grocery store sections. Always respond with valid JSON.";

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Classifier backed by a chat completion endpoint
pub struct OpenAiClassifier {
    client: Client,
    settings: OpenAiSettings,
    sections: Vec<String>,
}

impl OpenAiClassifier {
    /// Create a classifier asking the model for the given store sections
    pub fn new(settings: OpenAiSettings, sections: Vec<String>) -> Result<Self, ClassificationError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ClassificationError::Request(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %settings.base_url,
            model = %settings.model,
            "Classifier initialized"
        );

        Ok(Self {
            client,
            settings,
            sections,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// Build the user prompt for one round
    pub fn prompt(&self, ingredients: &[String]) -> String {
        let sections = self
            .sections
            .iter()
            .map(|section| format!("  - {}", section))
            .collect::<Vec<_>>()
            .join("\n");

        let example = self
            .sections
            .iter()
            .map(|section| format!("    \"{}\": [\"ingredient1\", \"ingredient2\"]", section))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "Categorize these ingredients into the following grocery store sections:\n{sections}\n\n  Ingredients: {}\n\n  Return the response in JSON format with the following structure:\n  {{\n{example}\n  }}\n  Use each ingredient name exactly as given.",
            ingredients.join(", ")
        )
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(
        &self,
        ingredients: &[String],
    ) -> Result<CategorizationAttempt, ClassificationError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: self.prompt(ingredients),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ClassificationError::EmptyResponse)?;

        tracing::debug!(%content, "Classification response");

        parse_classification_response(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn classifier_at(base_url: &str) -> OpenAiClassifier {
        let mut classifier = OpenAiClassifier::new(
            OpenAiSettings {
                api_key: "test".to_string(),
                base_url: base_url.to_string(),
                model: "gpt-4".to_string(),
                temperature: 0.3,
                max_tokens: 500,
                timeout: Duration::from_secs(5),
            },
            vec!["Meat".to_string(), "Veg".to_string()],
        )
        .unwrap();

        // Loopback test servers must not be routed through an ambient HTTP_PROXY
        classifier.client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        classifier
    }

    fn classifier() -> OpenAiClassifier {
        classifier_at("http://localhost:9/v1/")
    }

    /// Answer a single request with a canned HTTP response, returning the base URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain the request so the client never sees a reset mid-send
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/v1", addr)
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            classifier().endpoint(),
            "http://localhost:9/v1/chat/completions"
        );
    }

    #[test]
    fn test_prompt_lists_sections_and_ingredients() {
        let prompt = classifier().prompt(&["Salmon".to_string(), "Broccoli".to_string()]);

        assert!(prompt.starts_with("Categorize these ingredients"));
        assert!(prompt.contains("  - Meat\n  - Veg"));
        assert!(prompt.contains("Ingredients: Salmon, Broccoli"));
        assert!(prompt.contains("\"Veg\": [\"ingredient1\", \"ingredient2\"]"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_error() {
        let err = classifier()
            .classify(&["Salmon".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::Request(_)));
    }

    #[tokio::test]
    async fn test_completion_content_is_parsed() {
        let base_url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Sure! {\"Meat\": [\"Salmon\"], \"Veg\": [\"Broccoli\"]}"}}]}"#,
        )
        .await;

        let attempt = classifier_at(&base_url)
            .classify(&["Salmon".to_string(), "Broccoli".to_string()])
            .await
            .unwrap();

        assert_eq!(attempt["Meat"], vec!["Salmon"]);
        assert_eq!(attempt["Veg"], vec!["Broccoli"]);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let base_url = serve_once("500 Internal Server Error", "boom").await;

        let err = classifier_at(&base_url)
            .classify(&["Salmon".to_string()])
            .await
            .unwrap_err();

        assert!(
            matches!(err, ClassificationError::Status { status: 500, ref body } if body == "boom")
        );
    }

    #[tokio::test]
    async fn test_non_completion_body_is_parse_error() {
        let base_url = serve_once("200 OK", "not a completion").await;

        let err = classifier_at(&base_url)
            .classify(&["Salmon".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_response() {
        let base_url = serve_once("200 OK", r#"{"choices":[]}"#).await;

        let err = classifier_at(&base_url)
            .classify(&["Salmon".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ClassificationError::EmptyResponse));
    }
}
