use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use crate::core::model::StoryMode;

pub const API_KEY_ENV: &str = "API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_studio")]
    pub studio_folder: String,

    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub mode: StoryMode,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_script_model")]
    pub script_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    #[serde(default = "default_blog_model")]
    pub blog_model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            script_model: default_script_model(),
            image_model: default_image_model(),
            speech_model: default_speech_model(),
            blog_model: default_blog_model(),
            voice: default_voice(),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            studio_folder: default_studio(),
            output_folder: default_output(),
            topic: default_topic(),
            mode: StoryMode::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

fn default_studio() -> String {
    "studio".to_string()
}
fn default_output() -> String {
    "output".to_string()
}
fn default_topic() -> String {
    "الطفل الشجاع وكنز الأرقام".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_script_model() -> String {
    "gemini-3-pro-preview".to_string()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}
fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
fn default_blog_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_voice() -> String {
    "Kore".to_string()
}
fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml_ng::from_str(content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    /// Fills the credential from the environment when the file leaves it empty.
    pub fn with_api_key_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.gemini.api_key.is_empty() {
            if let Some(key) = lookup(API_KEY_ENV).or_else(|| lookup(GEMINI_API_KEY_ENV)) {
                self.gemini.api_key = key;
            }
        }
        self
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        let config = if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config.yml")?;
            Self::from_yaml(&content)?
        } else {
            log::warn!("config.yml not found, using defaults");
            Config::default()
        };

        let config = config.with_api_key_from(|name| std::env::var(name).ok());
        if config.gemini.api_key.is_empty() {
            anyhow::bail!(
                "No API key configured. Set gemini.api_key in config.yml or the {} environment variable.",
                API_KEY_ENV
            );
        }
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.studio_folder)?;
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}
