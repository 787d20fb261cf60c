use crate::i18n::LanguageCode;
use crate::translation::{TranslationError, Translator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Build the system prompt for translation
fn build_translation_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        r#"You are a professional translator for a product FAQ. Translate the user's text from {} to {}.

## Rules
- Return ONLY the translated text, with no preamble, quotes or explanation
- Preserve HTML markup exactly: keep every tag and attribute, translate only the visible text
- Do not translate URLs, email addresses or the contents of <code> elements
- Keep product names and acronyms as they are
- If a term has no good translation, keep the original term"#,
        source_language, target_language
    )
}

/// Translation backend backed by an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn build_request(&self, text: &str, source: &LanguageCode, target: &LanguageCode) -> TranslationRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_translation_system_prompt(
                        source.display_name(),
                        target.display_name(),
                    ),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { 4000 },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        let request = self.build_request(text, source, target);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Request(format!("failed to reach translation API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslationError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            TranslationError::Request(format!("failed to parse translation response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(TranslationError::EmptyResponse)
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ServiceMetrics;
    use crate::retry::RetryConfig;
    use crate::translation::TranslatorGateway;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn code(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    fn create_translator(api_url: &str) -> OpenAiTranslator {
        OpenAiTranslator::new(reqwest::Client::new(), api_url, "test-openai-key", "gpt-4o-mini")
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_build_translation_system_prompt() {
        let prompt = build_translation_system_prompt("English", "Hindi");

        assert!(prompt.contains("from English to Hindi"));
        assert!(prompt.contains("HTML"));
        assert!(prompt.contains("URLs"));
        assert!(prompt.contains("ONLY the translated text"));
    }

    #[test]
    fn test_build_request_uses_display_names() {
        let translator = create_translator("http://unused.test");
        let request = translator.build_request("What is X?", &code("en"), &code("bn"));

        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("Bengali"));
        assert_eq!(request.messages[1].content, "What is X?");
        assert_eq!(request.temperature, Some(0.2));
    }

    // ==================== Request Structure Tests ====================

    #[test]
    fn test_translation_request_serialization() {
        let translator = create_translator("http://unused.test");
        let request = translator.build_request("Hello world", &code("en"), &code("hi"));

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("max_completion_tokens"));
        assert!(json.contains("system"));
        assert!(json.contains("user"));
        // reasoning_effort should not be serialized when None
        assert!(!json.contains("reasoning_effort"));
    }

    #[test]
    fn test_translation_request_serialization_reasoning_model() {
        let translator =
            OpenAiTranslator::new(reqwest::Client::new(), "http://unused.test", "key", "gpt-5-mini");
        let request = translator.build_request("Test", &code("en"), &code("hi"));

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("16000"));
        assert!(json.contains("reasoning_effort"));
        // temperature should not be serialized when None
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o1-preview"));
        assert!(is_reasoning_model("o3"));
        assert!(is_reasoning_model("o4-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
        assert!(!is_reasoning_model("gpt-4-turbo"));
    }

    // ==================== Integration Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("X क्या है?")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = translator.translate("What is X?", &code("en"), &code("hi")).await;

        assert_eq!(result.unwrap(), "X क्या है?");
    }

    #[tokio::test]
    async fn test_translate_api_error_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = translator.translate("Test", &code("en"), &code("hi")).await;

        match result {
            Err(TranslationError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("Internal Server Error"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = translator.translate("Test", &code("en"), &code("hi")).await;

        assert_eq!(result, Err(TranslationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_translate_unreachable_backend() {
        // Nothing listens on port 9 (discard); connection is refused
        let translator = create_translator("http://127.0.0.1:9/v1/chat/completions");
        let result = translator.translate("Test", &code("en"), &code("hi")).await;

        assert!(matches!(result, Err(TranslationError::Request(_))));
    }

    // ==================== Gateway Retry Tests ====================

    fn create_gateway(api_url: &str) -> TranslatorGateway {
        TranslatorGateway::new(
            Arc::new(create_translator(api_url)),
            code("en"),
            Duration::from_secs(5),
            Arc::new(ServiceMetrics::new()),
        )
        .with_retry(RetryConfig::new(3, Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn test_gateway_retries_on_500_error() {
        let mock_server = MockServer::start().await;

        // First two requests fail with 500, third succeeds
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("X ইয়ে")),
            )
            .mount(&mock_server)
            .await;

        let gateway = create_gateway(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = gateway.translate("What is X?", &code("bn")).await;

        assert_eq!(result.unwrap(), "X ইয়ে");
    }

    #[tokio::test]
    async fn test_gateway_retries_on_429_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response("ठीक")))
            .mount(&mock_server)
            .await;

        let gateway = create_gateway(&format!("{}/v1/chat/completions", mock_server.uri()));
        assert!(gateway.translate("Okay then", &code("hi")).await.is_ok());
    }

    #[tokio::test]
    async fn test_gateway_no_retry_on_400_error() {
        let mock_server = MockServer::start().await;

        // 400 Bad Request should NOT be retried
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"message": "Bad request"}}"#),
            )
            .expect(1) // Should only be called once - no retries
            .mount(&mock_server)
            .await;

        let gateway = create_gateway(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = gateway.translate("What is X?", &code("hi")).await;

        assert!(matches!(result, Err(TranslationError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_gateway_exhausts_retries_on_persistent_500() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Persistent failure"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let gateway = create_gateway(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = gateway.translate("What is X?", &code("hi")).await;

        assert!(matches!(result, Err(TranslationError::Api { status: 500, .. })));
    }
}
