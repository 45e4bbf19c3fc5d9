use crate::core::config::GeminiConfig;
use crate::core::error::{ContentGenerationError, GatewayError};
use crate::core::model::{BlogPost, ScriptDraft, Story, StoryMode};
use crate::services::gateway::ContentGateway;
use crate::services::normalizer::parse_as;
use crate::services::prompts;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

pub struct GeminiGateway {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGateway")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

// --- Wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

impl GenerateRequest {
    fn user_text(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![RequestPart { text }],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn with_system(mut self, system: &str) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![RequestPart {
                text: system.to_string(),
            }],
        });
        self
    }

    fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

impl GenerateResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref().and_then(|c| c.first())
    }

    fn finish_reason(&self) -> &str {
        self.first_candidate()
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("UNKNOWN")
    }

    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_candidate()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
    }

    fn image_reference(&self) -> Option<String> {
        self.first_inline_data()
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
    }

    fn audio_payload(&self) -> Option<String> {
        self.first_inline_data().map(|d| d.data.clone())
    }
}

fn decode_response(body: &str) -> Result<GenerateResponse, GatewayError> {
    let result: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::Decode(format!("{}. Body: {}", e, body)))?;
    if let Some(err) = &result.error {
        return Err(GatewayError::Api(err.message.clone()));
    }
    Ok(result)
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str) -> Result<Url, GatewayError> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse_with_params(
            &format!("{}/models/{}:generateContent", base, model),
            &[("key", self.config.api_key.as_str())],
        )
        .map_err(|e| GatewayError::Transport(format!("invalid endpoint: {}", e)))
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GatewayError> {
        let url = self.endpoint(model)?;
        debug!("POST generateContent for model {}", model);

        let resp = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_response(&body)
    }

    async fn generate_json_text(&self, model: &str, request: GenerateRequest) -> Result<String, GatewayError> {
        let response = self.generate(model, &request).await?;
        let text = response.text();
        if text.is_empty() {
            warn!("Empty text response. Finish reason: {}", response.finish_reason());
        }
        Ok(text)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ContentGateway for GeminiGateway {
    async fn generate_script(
        &self,
        topic: &str,
        mode: StoryMode,
    ) -> Result<Story, ContentGenerationError> {
        info!("Requesting {} script for topic: {}", mode, topic);
        let request = GenerateRequest::user_text(prompts::script_prompt(topic, mode))
            .with_system(prompts::SCRIPT_SYSTEM_INSTRUCTION)
            .with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            });

        let text = self
            .generate_json_text(&self.config.script_model, request)
            .await?;
        let story = parse_as::<ScriptDraft>(&text)?.into_story(mode);
        info!("Script '{}' received with {} scenes", story.title, story.scenes.len());
        Ok(story)
    }

    async fn generate_illustration(
        &self,
        prompt: &str,
    ) -> Result<Option<String>, ContentGenerationError> {
        let request = GenerateRequest::user_text(prompts::illustration_prompt(prompt)).with_config(
            GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: self.config.aspect_ratio.clone(),
                }),
                ..Default::default()
            },
        );

        let response = self.generate(&self.config.image_model, &request).await?;
        let image = response.image_reference();
        if image.is_none() {
            warn!("No image part in response. Finish reason: {}", response.finish_reason());
        }
        Ok(image)
    }

    async fn generate_narration_audio(
        &self,
        text: &str,
    ) -> Result<Option<String>, ContentGenerationError> {
        let request = GenerateRequest::user_text(prompts::narration_prompt(text)).with_config(
            GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.config.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        );

        let response = self.generate(&self.config.speech_model, &request).await?;
        let audio = response.audio_payload();
        if audio.is_none() {
            warn!("No audio part in response. Finish reason: {}", response.finish_reason());
        }
        Ok(audio)
    }

    async fn generate_blog_post(&self) -> Result<BlogPost, ContentGenerationError> {
        info!("Requesting trending blog post");
        let request = GenerateRequest::user_text(prompts::BLOG_PROMPT.to_string()).with_config(
            GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            },
        );

        let text = self.generate_json_text(&self.config.blog_model, request).await?;
        Ok(parse_as::<BlogPost>(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ResponseParseError;
    use crate::core::model::ScriptDraft;

    #[test]
    fn test_speech_request_shape() {
        let request = GenerateRequest::user_text("hello".to_string()).with_config(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: "Kore".to_string(),
                    },
                },
            }),
            ..Default::default()
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            value["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert!(value.get("systemInstruction").is_none());
        assert!(value["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_script_request_shape() {
        let request = GenerateRequest::user_text("topic".to_string())
            .with_system("system")
            .with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_image_reference_from_inline_data() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your picture" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;

        let response = decode_response(json).unwrap();
        assert_eq!(
            response.image_reference().as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn test_missing_image_part_is_none() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [ { "text": "I cannot draw that." } ] },
                "finishReason": "STOP"
            }]
        }"#;
        let response = decode_response(json).unwrap();
        assert!(response.image_reference().is_none());
        assert!(response.audio_payload().is_none());
    }

    #[test]
    fn test_safety_block_without_content() {
        let json = r#"{ "candidates": [ { "finishReason": "SAFETY", "index": 0 } ] }"#;
        let response = decode_response(json).unwrap();
        assert!(response.audio_payload().is_none());
        assert_eq!(response.finish_reason(), "SAFETY");
        assert_eq!(response.text(), "");

        let response = decode_response("{}").unwrap();
        assert!(response.image_reference().is_none());
        assert_eq!(response.finish_reason(), "UNKNOWN");
    }

    #[test]
    fn test_audio_payload() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [ { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAABAAIA" } } ] }
            }]
        }"#;
        let response = decode_response(json).unwrap();
        assert_eq!(response.audio_payload().as_deref(), Some("AAABAAIA"));
    }

    #[test]
    fn test_api_error_body() {
        let json = r#"{ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } }"#;
        match decode_response(json) {
            Err(GatewayError::Api(message)) => assert_eq!(message, "API key not valid"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error"),
        }
        assert!(matches!(decode_response("<html>"), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_script_text_parts_are_joined_and_parsed() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [
                    { "text": "```json\n{\"title\": \"كنز\", \"scenes\": [" },
                    { "text": "{\"title\": \"أ\"}, {\"title\": \"ب\"}]}\n```" }
                ] }
            }]
        }"#;
        let response = decode_response(json).unwrap();
        let story = parse_as::<ScriptDraft>(&response.text())
            .unwrap()
            .into_story(StoryMode::Kids);
        assert_eq!(story.title, "كنز");
        let titles: Vec<_> = story.scenes.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["أ", "ب"]);
    }

    #[test]
    fn test_empty_script_text_is_parse_error() {
        let result: Result<ScriptDraft, ResponseParseError> = parse_as("");
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_carries_model_and_key() {
        let gateway = GeminiGateway::new(GeminiConfig {
            api_key: "k&1".to_string(),
            base_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        });
        let url = gateway.endpoint("gemini-2.5-flash-image").unwrap();
        assert_eq!(url.path(), "/v1beta/models/gemini-2.5-flash-image:generateContent");
        assert_eq!(url.query(), Some("key=k%261"));
    }
}
