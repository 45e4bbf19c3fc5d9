use crate::core::model::Story;
use serde::{Deserialize, Serialize};

/// Progress published when scripting starts.
pub const HEAD_START_PROGRESS: f64 = 10.0;
pub const COMPLETE_PROGRESS: f64 = 100.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Scripting,
    GeneratingAssets,
    Completed,
    Error,
}

impl GenerationStatus {
    /// Idle, Completed and Error all permit starting a new run.
    pub fn can_start(&self) -> bool {
        !matches!(self, GenerationStatus::Scripting | GenerationStatus::GeneratingAssets)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Studio,
    Revenue,
    Settings,
    ApkExport,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Studio,
        View::Revenue,
        View::ApkExport,
        View::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "الرئيسية",
            View::Studio => "الإنتاج",
            View::Revenue => "الأرباح",
            View::Settings => "الإعدادات",
            View::ApkExport => "تصدير APK",
        }
    }
}

/// One publication from the assembly loop. A carried story replaces the
/// whole snapshot; `None` leaves the current one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RunUpdate {
    pub status: GenerationStatus,
    pub progress: f64,
    pub story: Option<Story>,
}

impl RunUpdate {
    pub fn new(status: GenerationStatus, progress: f64) -> Self {
        Self {
            status,
            progress,
            story: None,
        }
    }

    pub fn with_story(mut self, story: Story) -> Self {
        self.story = Some(story);
        self
    }
}

/// Progress after `done` of `total` scenes have their assets.
pub fn scene_progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        return COMPLETE_PROGRESS;
    }
    HEAD_START_PROGRESS
        + (COMPLETE_PROGRESS - HEAD_START_PROGRESS) * done as f64 / total as f64
}

/// Caller-owned view of the current run. The assembly loop is its only
/// writer, through `apply`.
#[derive(Debug, Clone, Default)]
pub struct StudioState {
    pub status: GenerationStatus,
    pub progress: f64,
    pub story: Option<Story>,
    pub view: View,
}

impl StudioState {
    pub fn with_story(story: Option<Story>) -> Self {
        Self {
            story,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, update: RunUpdate) {
        self.status = update.status;
        // Display-only; a new run restarts from the head start.
        if update.status == GenerationStatus::Scripting || update.progress >= self.progress {
            self.progress = update.progress;
        }
        if let Some(story) = update.story {
            self.story = Some(story);
        }
        if update.status == GenerationStatus::Completed {
            self.view = View::Studio;
        }
    }

    pub fn can_start(&self) -> bool {
        self.status.can_start()
    }

    pub fn rounded_progress(&self) -> u32 {
        self.progress.round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ScriptDraft, StoryMode};

    #[test]
    fn test_scene_progress_arithmetic() {
        assert_eq!(scene_progress(0, 2), 10.0);
        assert_eq!(scene_progress(1, 2), 55.0);
        assert_eq!(scene_progress(2, 2), 100.0);
        assert_eq!(scene_progress(3, 3), 100.0);
        assert_eq!(scene_progress(0, 0), 100.0);
    }

    #[test]
    fn test_can_start_after_terminal_status() {
        assert!(GenerationStatus::Idle.can_start());
        assert!(!GenerationStatus::Scripting.can_start());
        assert!(!GenerationStatus::GeneratingAssets.can_start());
        assert!(GenerationStatus::Completed.can_start());
        assert!(GenerationStatus::Error.can_start());
    }

    #[test]
    fn test_apply_keeps_story_when_update_has_none() {
        let story = ScriptDraft::default().into_story(StoryMode::Kids);
        let mut state = StudioState::with_story(Some(story.clone()));

        state.apply(RunUpdate::new(GenerationStatus::Scripting, 10.0));
        state.apply(RunUpdate::new(GenerationStatus::Error, 10.0));

        assert_eq!(state.status, GenerationStatus::Error);
        assert_eq!(state.story, Some(story));
        assert_eq!(state.view, View::Dashboard);
    }

    #[test]
    fn test_apply_completed_switches_to_studio() {
        let mut state = StudioState::default();
        state.apply(RunUpdate::new(GenerationStatus::Scripting, 10.0));
        state.apply(
            RunUpdate::new(GenerationStatus::Completed, 100.0)
                .with_story(ScriptDraft::default().into_story(StoryMode::Tourism)),
        );
        assert_eq!(state.view, View::Studio);
        assert_eq!(state.rounded_progress(), 100);
        assert!(state.story.is_some());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&GenerationStatus::GeneratingAssets).unwrap(),
            "\"GENERATING_ASSETS\""
        );
    }
}
