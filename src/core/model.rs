use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryMode {
    #[default]
    Kids,
    Tourism,
    AdultsTech,
    Marketing,
    DigitalBusiness,
    HistoryCiv,
    BlogPost,
}

impl StoryMode {
    pub const ALL: [StoryMode; 7] = [
        StoryMode::Kids,
        StoryMode::Tourism,
        StoryMode::AdultsTech,
        StoryMode::Marketing,
        StoryMode::DigitalBusiness,
        StoryMode::HistoryCiv,
        StoryMode::BlogPost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryMode::Kids => "kids",
            StoryMode::Tourism => "tourism",
            StoryMode::AdultsTech => "adults_tech",
            StoryMode::Marketing => "marketing",
            StoryMode::DigitalBusiness => "digital_business",
            StoryMode::HistoryCiv => "history_civ",
            StoryMode::BlogPost => "blog_post",
        }
    }

    /// Arabic label used inside prompts and on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            StoryMode::Kids => "قصة أطفال",
            StoryMode::Tourism => "محتوى سياحي",
            StoryMode::AdultsTech => "تقنية للكبار",
            StoryMode::Marketing => "محتوى تسويقي",
            StoryMode::DigitalBusiness => "أعمال رقمية",
            StoryMode::HistoryCiv => "تاريخ وحضارات",
            StoryMode::BlogPost => "مقال مدونة",
        }
    }

    pub fn audience(&self) -> &'static str {
        match self {
            StoryMode::Kids => "أطفال من 4 إلى 10 سنوات وأولياء أمورهم",
            StoryMode::Tourism => "المسافرون ومحبو استكشاف الوجهات",
            StoryMode::AdultsTech => "البالغون المهتمون بالتقنية",
            StoryMode::Marketing => "أصحاب المشاريع والمسوقون",
            StoryMode::DigitalBusiness => "رواد الأعمال الرقميون",
            StoryMode::HistoryCiv => "محبو التاريخ والحضارات",
            StoryMode::BlogPost => "قراء المدونات والباحثون عبر جوجل",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for StoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Creation-time story identifier. Strictly increasing within a process,
/// so two stories created in the same millisecond still differ.
pub fn fresh_story_id() -> String {
    let now = now_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub visual_description: String,
    /// Data URI or external URL of the generated illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Base64 narration audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(skip)]
    assets_attached: bool,
}

impl Scene {
    pub fn new(title: &str, narration: &str, image_prompt: &str, visual_description: &str) -> Self {
        Self {
            title: title.to_string(),
            narration: narration.to_string(),
            image_prompt: image_prompt.to_string(),
            visual_description: visual_description.to_string(),
            ..Default::default()
        }
    }

    /// Writes the generated assets into the scene. Assets are write-once per
    /// run: returns false and leaves the scene untouched on a second call.
    pub fn attach_assets(&mut self, image: Option<String>, audio: Option<String>) -> bool {
        if self.assets_attached {
            return false;
        }
        self.video_url = image;
        self.audio_data = audio;
        self.assets_attached = true;
        true
    }

    pub fn has_image(&self) -> bool {
        self.video_url.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        self.audio_data.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonetizationStrategy {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub suggested_products: Vec<String>,
    #[serde(default, rename = "estimatedCPM")]
    pub estimated_cpm: String,
    #[serde(default)]
    pub affiliate_links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail_prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mode: StoryMode,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub moral_or_lesson: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monetization: Option<MonetizationStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_data: Option<YouTubeMetadata>,
}

/// The story shape the remote service is asked to produce. It carries no
/// identifier or mode; those are attached locally.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub moral_or_lesson: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub monetization: Option<MonetizationStrategy>,
    #[serde(default)]
    pub youtube_data: Option<YouTubeMetadata>,
}

impl ScriptDraft {
    pub fn into_story(self, mode: StoryMode) -> Story {
        Story {
            id: fresh_story_id(),
            title: self.title,
            mode,
            target_audience: self.target_audience,
            moral_or_lesson: self.moral_or_lesson,
            scenes: self.scenes,
            monetization: self.monetization,
            youtube_data: self.youtube_data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BlogSeo {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BlogPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seo: BlogSeo,
}

/// Publishing destinations. Persisted independently of the story.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SocialLinks {
    #[serde(default)]
    pub blogger: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}
