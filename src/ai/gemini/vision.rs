use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, HarmBlockThreshold,
    HarmCategory, InlineData, Part, SafetySetting,
};
use crate::ai::VisionService;
use crate::models::InlineImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Sampling parameters for UI critique, fixed for the process lifetime.
const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    top_k: 32,
    top_p: 1.0,
    max_output_tokens: 4096,
};

/// Moderation policy attached to every request. All four categories must be
/// present: an absent category means "unfiltered", which policy disallows.
/// Callers cannot lower these thresholds per request.
const MODERATION_POLICY: [SafetySetting; 4] = [
    SafetySetting {
        category: HarmCategory::Harassment,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HateSpeech,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::SexuallyExplicit,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::DangerousContent,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
];

pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Build the single-turn request: instruction text first, then the
    /// inline image, with the process-wide config and policy attached
    /// verbatim.
    fn compose(prompt: &str, image: &InlineImage) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GENERATION_CONFIG,
            safety_settings: MODERATION_POLICY.to_vec(),
        }
    }

    /// First text part of the first candidate, or [`Error::EmptyCompletion`]
    /// when the model produced no text at all (for example a completion
    /// fully blocked by moderation). Never converted to an empty string.
    fn extract_text(response: &GenerateContentResponse) -> Result<String> {
        response
            .candidates
            .first()
            .and_then(|c| {
                c.content.parts.iter().find_map(|p| match p {
                    Part::Text { text } => Some(text.clone()),
                    Part::InlineData { .. } => None,
                })
            })
            .ok_or(Error::EmptyCompletion)
    }
}

#[async_trait]
impl VisionService for GeminiVisionClient {
    async fn analyze(&self, prompt: &str, image: &InlineImage) -> Result<String> {
        tracing::debug!(
            "Analyzing {} image ({} base64 chars) via Gemini",
            image.mime_type,
            image.data.len()
        );

        let request = Self::compose(prompt, image);
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Self::extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_CONTENT_PATH_REGEX: &str = r"/v1beta/models/.+:generateContent";

    fn make_client(server: &MockServer) -> GeminiVisionClient {
        GeminiVisionClient::new("test-key".to_string(), "gemini-1.5-flash".to_string())
            .with_base_url(server.uri())
    }

    fn png_part() -> InlineImage {
        InlineImage::encode(&[0x89, 0x50, 0x4E, 0x47], "image/png")
    }

    #[tokio::test]
    async fn test_analyze_returns_completion_text_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "The layout is cluttered." }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let analysis = client
            .analyze("Analyze this webpage UI", &png_part())
            .await
            .unwrap();

        assert_eq!(analysis, "The layout is cluttered.");
    }

    #[tokio::test]
    async fn test_request_carries_prompt_before_image_and_full_policy() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "ok" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        client
            .analyze("Critique the navigation", &png_part())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Critique the navigation");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");

        let categories: Vec<&str> = body["safetySettings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["category"].as_str().unwrap())
            .collect();
        assert_eq!(
            categories,
            vec![
                "HARM_CATEGORY_HARASSMENT",
                "HARM_CATEGORY_HATE_SPEECH",
                "HARM_CATEGORY_SEXUALLY_EXPLICIT",
                "HARM_CATEGORY_DANGEROUS_CONTENT",
            ]
        );
        for setting in body["safetySettings"].as_array().unwrap() {
            assert_eq!(setting["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
        }

        assert_eq!(body["generationConfig"]["topK"], 32);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.analyze("prompt", &png_part()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_candidate_without_text_parts_is_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aGk=" } }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.analyze("prompt", &png_part()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_api_error_is_model_invocation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.analyze("prompt", &png_part()).await.unwrap_err();

        match err {
            Error::ModelInvocation(message) => assert!(message.contains("quota exceeded")),
            other => panic!("expected ModelInvocation, got {:?}", other),
        }
    }
}
