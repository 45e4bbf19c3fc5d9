use crate::core::error::StudioError;
use crate::core::io::Storage;
use crate::core::model::{SocialLinks, Story, StoryMode};
use crate::core::state::{RunUpdate, StudioState};
use crate::services::gateway::ContentGateway;
use crate::services::workflow::{AssemblyLoop, ObserverBounds, RunObserver};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

pub const STORY_KEY: &str = "current_story";
pub const SOCIAL_LINKS_KEY: &str = "social_links";

/// The two independently persisted studio values.
#[derive(Clone)]
pub struct StudioStore {
    storage: Arc<dyn Storage>,
    root: String,
}

impl StudioStore {
    /// `root` prefixes every key; empty for key-value backends.
    pub fn new(storage: Arc<dyn Storage>, root: &str) -> Self {
        Self {
            storage,
            root: root.trim_end_matches('/').to_string(),
        }
    }

    fn key_path(&self, key: &str) -> String {
        if self.root.is_empty() {
            format!("{}.json", key)
        } else {
            format!("{}/{}.json", self.root, key)
        }
    }

    async fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        if !self.storage.exists(&path).await? {
            return Ok(None);
        }
        let bytes = self.storage.read(&path).await?;
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse stored {}", key))?;
        Ok(Some(value))
    }

    async fn save_json<T: serde::Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        self.storage
            .write(&self.key_path(key), content.as_bytes())
            .await
            .with_context(|| format!("Failed to store {}", key))
    }

    pub async fn load_story(&self) -> Result<Option<Story>> {
        self.load_json(STORY_KEY).await
    }

    pub async fn save_story(&self, story: &Story) -> Result<()> {
        self.save_json(STORY_KEY, story).await
    }

    pub async fn load_social_links(&self) -> Result<SocialLinks> {
        Ok(self.load_json(SOCIAL_LINKS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_social_links(&self, links: &SocialLinks) -> Result<()> {
        self.save_json(SOCIAL_LINKS_KEY, links).await
    }

    /// Best-effort save of the story snapshot an update carries.
    async fn persist_snapshot(&self, update: &RunUpdate) {
        if let Some(story) = &update.story {
            if let Err(e) = self.save_story(story).await {
                warn!("Failed to persist story snapshot: {:#}", e);
            }
        }
    }
}

/// Front-end hook called after every state change during a run.
pub trait StateWatcher: ObserverBounds {
    fn state_changed(&mut self, state: &StudioState);
}

/// Presentation-side owner of the run state. Persists every published story
/// snapshot on a best-effort basis.
#[derive(Clone)]
pub struct StudioSession {
    state: StudioState,
    social_links: SocialLinks,
    store: StudioStore,
}

impl StudioSession {
    /// Restores the last story and links. Unreadable values fall back to
    /// their defaults.
    pub async fn open(store: StudioStore) -> Self {
        let story = store.load_story().await.unwrap_or_else(|e| {
            warn!("Ignoring stored story: {:#}", e);
            None
        });
        let social_links = store.load_social_links().await.unwrap_or_else(|e| {
            warn!("Ignoring stored social links: {:#}", e);
            SocialLinks::default()
        });
        Self {
            state: StudioState::with_story(story),
            social_links,
            store,
        }
    }

    pub fn state(&self) -> &StudioState {
        &self.state
    }

    pub fn social_links(&self) -> &SocialLinks {
        &self.social_links
    }

    pub fn store(&self) -> &StudioStore {
        &self.store
    }

    /// Runs the assembly loop with this session as its observer. Refused
    /// while another run is scripting or generating assets.
    pub async fn start_run(
        &mut self,
        gateway: &dyn ContentGateway,
        topic: &str,
        mode: StoryMode,
        watcher: &mut dyn StateWatcher,
    ) -> Result<Story, StudioError> {
        if !self.state.can_start() {
            return Err(StudioError::Busy);
        }
        info!("Starting run for topic: {}", topic);
        let mut observer = WatchedSession {
            session: self,
            watcher,
        };
        Ok(AssemblyLoop::new(gateway).run(topic, mode, &mut observer).await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RunObserver for StudioSession {
    async fn publish(&mut self, update: RunUpdate) {
        self.store.persist_snapshot(&update).await;
        self.state.apply(update);
    }
}

struct WatchedSession<'a> {
    session: &'a mut StudioSession,
    watcher: &'a mut dyn StateWatcher,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<'a> RunObserver for WatchedSession<'a> {
    async fn publish(&mut self, update: RunUpdate) {
        self.session.publish(update).await;
        self.watcher.state_changed(&self.session.state);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;
    use crate::core::state::{GenerationStatus, View};
    use crate::services::workflow::tests::MockGateway;

    impl StateWatcher for Vec<StudioState> {
        fn state_changed(&mut self, state: &StudioState) {
            self.push(state.clone());
        }
    }

    fn temp_store(dir: &tempfile::TempDir) -> StudioStore {
        StudioStore::new(Arc::new(NativeStorage::new()), dir.path().to_str().unwrap())
    }

    #[tokio::test]
    async fn test_defaults_when_nothing_stored() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = temp_store(&dir);
        assert!(store.load_story().await?.is_none());
        assert_eq!(store.load_social_links().await?.blogger, "");

        let session = StudioSession::open(store).await;
        assert!(session.state().story.is_none());
        assert_eq!(session.state().status, GenerationStatus::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn test_completed_run_is_persisted_and_restored() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let gateway = MockGateway::with_scenes(2);

        let mut session = StudioSession::open(temp_store(&dir)).await;
        let story = session
            .start_run(&gateway, "الطفل الشجاع وكنز الأرقام", StoryMode::Kids, &mut Vec::<StudioState>::new())
            .await?;
        assert_eq!(session.state().status, GenerationStatus::Completed);
        assert_eq!(session.state().view, View::Studio);
        assert_eq!(session.state().rounded_progress(), 100);

        let reopened = StudioSession::open(temp_store(&dir)).await;
        let restored = reopened.state().story.clone().unwrap();
        assert_eq!(restored.id, story.id);
        assert_eq!(restored.scenes.len(), 2);
        assert!(restored.scenes.iter().all(|s| s.has_image() && s.has_audio()));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_script_leaves_previous_story() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut session = StudioSession::open(temp_store(&dir)).await;
        let first = session
            .start_run(&MockGateway::with_scenes(1), "first", StoryMode::Kids, &mut Vec::<StudioState>::new())
            .await?;

        let failing = MockGateway {
            script_fails: true,
            ..MockGateway::with_scenes(1)
        };
        let result = session
            .start_run(&failing, "second", StoryMode::Kids, &mut Vec::<StudioState>::new())
            .await;
        assert!(matches!(result, Err(StudioError::Generation(_))));
        assert_eq!(session.state().status, GenerationStatus::Error);
        assert_eq!(session.state().story.as_ref().map(|s| s.id.clone()), Some(first.id.clone()));

        let stored = temp_store(&dir).load_story().await?.unwrap();
        assert_eq!(stored.id, first.id);

        // Error permits a new run.
        assert!(session.state().can_start());
        Ok(())
    }

    #[tokio::test]
    async fn test_busy_session_refuses_new_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut session = StudioSession::open(temp_store(&dir)).await;
        session
            .publish(RunUpdate::new(GenerationStatus::GeneratingAssets, 10.0))
            .await;

        let gateway = MockGateway::with_scenes(1);
        let mut watched: Vec<StudioState> = Vec::new();
        let result = session
            .start_run(&gateway, "topic", StoryMode::Kids, &mut watched)
            .await;
        assert!(matches!(result, Err(StudioError::Busy)));
        assert!(gateway.calls.lock().unwrap().is_empty());
        assert!(watched.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_watcher_sees_every_applied_state() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut session = StudioSession::open(temp_store(&dir)).await;
        let mut watched: Vec<StudioState> = Vec::new();
        session
            .start_run(&MockGateway::with_scenes(2), "topic", StoryMode::Kids, &mut watched)
            .await?;

        let seen: Vec<_> = watched
            .iter()
            .map(|s| (s.status, s.rounded_progress()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (GenerationStatus::Scripting, 10),
                (GenerationStatus::GeneratingAssets, 10),
                (GenerationStatus::GeneratingAssets, 55),
                (GenerationStatus::Completed, 100),
            ]
        );
        assert!(watched[0].story.is_none());
        assert_eq!(watched.last().map(|s| s.view), Some(View::Studio));

        // The final snapshot was persisted before the watcher saw it.
        let stored = temp_store(&dir).load_story().await?.unwrap();
        let last = watched.last().and_then(|s| s.story.as_ref()).unwrap();
        assert_eq!(stored.id, last.id);
        assert!(stored.scenes.iter().all(|s| s.has_image() && s.has_audio()));
        Ok(())
    }

    #[tokio::test]
    async fn test_social_links_persist_independently() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let session = StudioSession::open(temp_store(&dir)).await;
        session
            .store()
            .save_social_links(&SocialLinks {
                blogger: "https://kids.blogspot.com".to_string(),
                ..Default::default()
            })
            .await?;

        let reopened = StudioSession::open(temp_store(&dir)).await;
        assert_eq!(reopened.social_links().blogger, "https://kids.blogspot.com");
        assert!(reopened.state().story.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_story_falls_back_to_empty_studio() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("current_story.json"), "not json")?;
        let store = temp_store(&dir);
        assert!(store.load_story().await.is_err());

        let session = StudioSession::open(store).await;
        assert!(session.state().story.is_none());
        Ok(())
    }
}
