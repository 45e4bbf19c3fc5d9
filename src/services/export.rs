use crate::core::io::Storage;
use crate::core::model::{BlogPost, Story, StoryMode};
use crate::services::gateway::ContentGateway;
use crate::utils::audio::{decode_data_uri, narration_wav};
use anyhow::Result;
use log::{info, warn};

pub const APP_NAME: &str = "StoryProfit AI";
pub const APK_CONVERTER_URL: &str = "https://www.web2apk.com";
pub const DEFAULT_CPM_RANGE: &str = "$7 - $12";

/// Data behind the revenue view. Every value is passed through from the
/// remote payload; nothing is computed or validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSummary {
    pub niche: String,
    pub method: String,
    pub cpm_range: String,
    pub youtube_tags: Vec<String>,
    pub affiliate_products: Vec<String>,
    pub affiliate_links: Vec<String>,
}

impl RevenueSummary {
    pub fn from_story(story: Option<&Story>) -> Self {
        let mode = story.map(|s| s.mode).unwrap_or_default();
        let monetization = story.and_then(|s| s.monetization.as_ref());
        let youtube = story.and_then(|s| s.youtube_data.as_ref());

        let cpm_range = monetization
            .map(|m| m.estimated_cpm.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CPM_RANGE)
            .to_string();

        Self {
            niche: niche_for(mode).to_string(),
            method: monetization.map(|m| m.method.clone()).unwrap_or_default(),
            cpm_range,
            youtube_tags: youtube.map(|y| y.tags.clone()).unwrap_or_default(),
            affiliate_products: monetization
                .map(|m| m.suggested_products.clone())
                .unwrap_or_default(),
            affiliate_links: monetization
                .map(|m| m.affiliate_links.clone())
                .unwrap_or_default(),
        }
    }
}

fn niche_for(mode: StoryMode) -> &'static str {
    match mode {
        StoryMode::Kids => "قصص تعليمية قصيرة للأطفال",
        StoryMode::Tourism => "السياحة والسفر",
        StoryMode::AdultsTech => "التقنية والبرمجيات",
        StoryMode::Marketing => "التسويق الرقمي",
        StoryMode::DigitalBusiness => "الأعمال والربح من الإنترنت",
        StoryMode::HistoryCiv => "التاريخ والحضارات",
        StoryMode::BlogPost => "التدوين و SEO",
    }
}

/// Values to paste into a web-to-APK converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ApkExportInfo {
    pub app_name: String,
    pub website_url: String,
    pub converter_url: String,
}

impl ApkExportInfo {
    pub fn new(website_url: &str) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            website_url: website_url.to_string(),
            converter_url: APK_CONVERTER_URL.to_string(),
        }
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Writes the story JSON and every decodable scene asset under `folder`.
/// Returns the written paths. Scenes without assets are skipped; undecodable
/// assets are logged and skipped.
pub async fn export_story(story: &Story, storage: &dyn Storage, folder: &str) -> Result<Vec<String>> {
    let folder = folder.trim_end_matches('/');
    let mut written = Vec::new();

    let story_path = format!("{}/story.json", folder);
    storage
        .write(&story_path, serde_json::to_string_pretty(story)?.as_bytes())
        .await?;
    written.push(story_path);

    for (i, scene) in story.scenes.iter().enumerate() {
        let n = i + 1;
        if let Some(image) = scene.video_url.as_deref().filter(|s| !s.is_empty()) {
            match decode_data_uri(image) {
                Ok((mime, bytes)) => {
                    let path = format!("{}/scene_{:02}.{}", folder, n, extension_for(&mime));
                    storage.write(&path, &bytes).await?;
                    written.push(path);
                }
                Err(e) => warn!("Skipping image of scene {}: {}", n, e),
            }
        }

        if let Some(audio) = scene.audio_data.as_deref().filter(|s| !s.is_empty()) {
            match narration_wav(audio) {
                Ok(wav) => {
                    let path = format!("{}/scene_{:02}.wav", folder, n);
                    storage.write(&path, &wav).await?;
                    written.push(path);
                }
                Err(e) => warn!("Skipping narration of scene {}: {}", n, e),
            }
        }
    }

    info!("Exported {} files to {}", written.len(), folder);
    Ok(written)
}

/// Drafts the companion blog article and writes it as `blog.json` under
/// `folder`.
pub async fn export_blog_post(
    gateway: &dyn ContentGateway,
    storage: &dyn Storage,
    folder: &str,
) -> Result<BlogPost> {
    let post = gateway.generate_blog_post().await?;
    let path = format!("{}/blog.json", folder.trim_end_matches('/'));
    storage
        .write(&path, serde_json::to_string_pretty(&post)?.as_bytes())
        .await?;
    info!("Blog post '{}' written to {}", post.title, path);
    Ok(post)
}
