use crate::core::config::Config;
use crate::core::error::ContentGenerationError;
use crate::core::model::{BlogPost, Story, StoryMode};
use crate::services::gemini::GeminiGateway;
use async_trait::async_trait;
use log::info;

#[cfg(target_arch = "wasm32")]
pub trait GatewayBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> GatewayBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait GatewayBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> GatewayBounds for T {}

/// Boundary around every call to the hosted generative model.
///
/// Asset operations follow a silent-failure policy: a response without the
/// expected image or audio part yields `Ok(None)`, while a failed call is an
/// error.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ContentGateway: GatewayBounds {
    /// Requests a story script and returns it with a fresh identifier and
    /// the given mode attached.
    async fn generate_script(
        &self,
        topic: &str,
        mode: StoryMode,
    ) -> Result<Story, ContentGenerationError>;

    /// Returns a `data:<mime>;base64,<payload>` image reference.
    async fn generate_illustration(
        &self,
        prompt: &str,
    ) -> Result<Option<String>, ContentGenerationError>;

    /// Returns the base64 narration audio.
    async fn generate_narration_audio(
        &self,
        text: &str,
    ) -> Result<Option<String>, ContentGenerationError>;

    async fn generate_blog_post(&self) -> Result<BlogPost, ContentGenerationError>;
}

pub fn create_gateway(config: &Config) -> Box<dyn ContentGateway> {
    info!(
        "Initializing Gemini gateway (script: {}, image: {}, speech: {})",
        config.gemini.script_model, config.gemini.image_model, config.gemini.speech_model
    );
    Box::new(GeminiGateway::new(config.gemini.clone()))
}
