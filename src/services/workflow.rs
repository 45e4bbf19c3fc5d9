use crate::core::error::ContentGenerationError;
use crate::core::model::{Story, StoryMode};
use crate::core::state::{
    scene_progress, GenerationStatus, RunUpdate, COMPLETE_PROGRESS, HEAD_START_PROGRESS,
};
use crate::services::gateway::ContentGateway;
use async_trait::async_trait;
use futures_util::future::try_join;
use log::{error, info};

#[cfg(target_arch = "wasm32")]
pub trait ObserverBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> ObserverBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait ObserverBounds: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> ObserverBounds for T {}

/// Receives every publication of a run, in order.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RunObserver: ObserverBounds {
    async fn publish(&mut self, update: RunUpdate);
}

/// Drives one end-to-end generation run: script first, then each scene's
/// illustration and narration side by side, one scene at a time.
pub struct AssemblyLoop<'a> {
    gateway: &'a dyn ContentGateway,
}

impl<'a> AssemblyLoop<'a> {
    pub fn new(gateway: &'a dyn ContentGateway) -> Self {
        Self { gateway }
    }

    pub async fn run(
        &self,
        topic: &str,
        mode: StoryMode,
        observer: &mut dyn RunObserver,
    ) -> Result<Story, ContentGenerationError> {
        observer
            .publish(RunUpdate::new(GenerationStatus::Scripting, HEAD_START_PROGRESS))
            .await;

        let mut story = match self.gateway.generate_script(topic, mode).await {
            Ok(story) => story,
            Err(e) => {
                error!("Script generation failed: {}", e);
                observer
                    .publish(RunUpdate::new(GenerationStatus::Error, HEAD_START_PROGRESS))
                    .await;
                return Err(e);
            }
        };

        let total = story.scenes.len();
        info!("Generating assets for {} scenes", total);
        observer
            .publish(
                RunUpdate::new(GenerationStatus::GeneratingAssets, HEAD_START_PROGRESS)
                    .with_story(story.clone()),
            )
            .await;

        for i in 0..total {
            let scene = &story.scenes[i];
            let assets = try_join(
                self.gateway.generate_illustration(&scene.image_prompt),
                self.gateway.generate_narration_audio(&scene.narration),
            )
            .await;

            let (image, audio) = match assets {
                Ok(pair) => pair,
                Err(e) => {
                    error!("Asset generation failed at scene {}: {}", i + 1, e);
                    observer
                        .publish(RunUpdate::new(
                            GenerationStatus::Error,
                            scene_progress(i, total),
                        ))
                        .await;
                    return Err(e);
                }
            };

            if image.is_none() || audio.is_none() {
                info!(
                    "Scene {} continues with missing assets (image: {}, audio: {})",
                    i + 1,
                    image.is_some(),
                    audio.is_some()
                );
            }
            let attached = story.scenes[i].attach_assets(image, audio);
            debug_assert!(attached, "scene {} assets written twice", i + 1);

            let done = i + 1;
            // The last scene is published together with the terminal status.
            let status = if done == total {
                GenerationStatus::Completed
            } else {
                GenerationStatus::GeneratingAssets
            };
            observer
                .publish(RunUpdate::new(status, scene_progress(done, total)).with_story(story.clone()))
                .await;
        }

        if total == 0 {
            observer
                .publish(
                    RunUpdate::new(GenerationStatus::Completed, COMPLETE_PROGRESS)
                        .with_story(story.clone()),
                )
                .await;
        }

        info!("Run complete: '{}'", story.title);
        Ok(story)
    }
}
