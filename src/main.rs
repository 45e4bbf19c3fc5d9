#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::sync::Arc;
    use storyprofit::core::config::Config;
    use storyprofit::core::io::NativeStorage;
    use storyprofit::core::model::StoryMode;
    use storyprofit::core::state::StudioState;
    use storyprofit::services::export::{export_blog_post, export_story, RevenueSummary};
    use storyprofit::services::gateway::create_gateway;
    use storyprofit::services::studio::{StateWatcher, StudioSession, StudioStore};

    /// Mirrors the session state onto the terminal.
    struct TerminalProgress(ProgressBar);

    impl StateWatcher for TerminalProgress {
        fn state_changed(&mut self, state: &StudioState) {
            self.0.set_position(state.rounded_progress() as u64);
            self.0.set_message(format!("{:?}", state.status));
        }
    }

    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            return Err(e);
        }
    };
    config.ensure_directories()?;

    let storage = Arc::new(NativeStorage::new());
    let store = StudioStore::new(storage.clone(), &config.studio_folder);
    let mut session = StudioSession::open(store).await;
    let gateway = create_gateway(&config);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    println!("Generating {} story: {}", config.mode, config.topic);
    let mut progress = TerminalProgress(bar.clone());
    let result = session
        .start_run(gateway.as_ref(), &config.topic, config.mode, &mut progress)
        .await;
    bar.finish();

    let story = result?;
    println!("Story complete: {} ({} scenes)", story.title, story.scenes.len());

    let folder = format!("{}/{}", config.output_folder, story.id);
    let written = export_story(&story, storage.as_ref(), &folder).await?;
    println!("Exported {} files to {}", written.len(), folder);

    if config.mode == StoryMode::BlogPost {
        let post = export_blog_post(gateway.as_ref(), storage.as_ref(), &folder).await?;
        println!("Blog post: {}", post.title);
        if !post.seo.keywords.is_empty() {
            println!("SEO keywords: {}", post.seo.keywords.join(", "));
        }
    }

    let revenue = RevenueSummary::from_story(session.state().story.as_ref());
    println!("Niche: {} | CPM: {}", revenue.niche, revenue.cpm_range);
    if !revenue.youtube_tags.is_empty() {
        println!("Tags: {}", revenue.youtube_tags.join(", "));
    }
    for product in &revenue.affiliate_products {
        println!("Affiliate: {}", product);
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
