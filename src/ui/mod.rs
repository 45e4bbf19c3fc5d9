use crate::core::config::GeminiConfig;
use crate::core::error::StudioError;
use crate::core::io::Storage;
use crate::core::model::{BlogPost, StoryMode};
use crate::core::state::{GenerationStatus, StudioState, View};
use crate::core::web_io::WebStorage;
use crate::services::export::{ApkExportInfo, RevenueSummary};
use crate::services::gateway::ContentGateway;
use crate::services::gemini::GeminiGateway;
use crate::services::studio::{StateWatcher, StudioSession, StudioStore};
use crate::utils::audio::narration_data_uri;
use leptos::*;
use std::sync::Arc;

const DEFAULT_TOPIC: &str = "الطفل الشجاع وكنز الأرقام";

/// Mirrors session state into the reactive signal. The selected tab stays
/// with the user until a run completes.
struct SignalWatcher {
    state: WriteSignal<StudioState>,
}

impl StateWatcher for SignalWatcher {
    fn state_changed(&mut self, next: &StudioState) {
        let next = next.clone();
        self.state.update(move |s| {
            let view = if next.status == GenerationStatus::Completed {
                next.view
            } else {
                s.view
            };
            *s = next;
            s.view = view;
        });
    }
}

fn browser_gateway(api_key: String) -> GeminiGateway {
    GeminiGateway::new(GeminiConfig {
        api_key,
        ..Default::default()
    })
}

fn play_narration(audio: &str) {
    let result = narration_data_uri(audio)
        .map_err(|e| format!("{:#}", e))
        .and_then(|uri| {
            web_sys::HtmlAudioElement::new_with_src(&uri)
                .and_then(|el| el.play())
                .map(|_| ())
                .map_err(|e| format!("{:?}", e))
        });
    if let Err(e) = result {
        leptos::logging::error!("Failed to play narration: {}", e);
    }
}

fn copy_text(text: String) {
    let promise = window().navigator().clipboard().write_text(&text);
    spawn_local(async move {
        if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
            leptos::logging::error!("Failed to copy to clipboard: {:?}", e);
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let (session, set_session) = create_signal(None::<Result<StudioSession, String>>);

    create_effect(move |_| {
        spawn_local(async move {
            let res = match WebStorage::new().await {
                Ok(s) => {
                    let store = StudioStore::new(Arc::new(s) as Arc<dyn Storage>, "");
                    Ok(StudioSession::open(store).await)
                }
                Err(e) => Err(e.to_string()),
            };
            set_session.set(Some(res));
        });
    });

    view! {
        <div class="app-container" dir="rtl">
            <h1>"StoryProfit " <span class="accent">"PRO"</span></h1>
            {move || match session.get() {
                Some(Ok(s)) => view! { <Studio session=s/> }.into_view(),
                Some(Err(e)) => view! { <p>"Error loading storage: " {e}</p> }.into_view(),
                None => view! { <p>"Loading Storage..."</p> }.into_view()
            }}
        </div>
    }
}

#[component]
pub fn Studio(session: StudioSession) -> impl IntoView {
    let store = session.store().clone();
    let (state, set_state) = create_signal(session.state().clone());
    let (links, set_links) = create_signal(session.social_links().clone());
    let (topic, set_topic) = create_signal(DEFAULT_TOPIC.to_string());
    let (mode, set_mode) = create_signal(StoryMode::Kids);
    let (api_key, set_api_key) =
        create_signal(option_env!("API_KEY").unwrap_or_default().to_string());
    let (blog, set_blog) = create_signal(None::<BlogPost>);
    let (blog_pending, set_blog_pending) = create_signal(false);
    // Taken out for the duration of a run; absent means busy.
    let session = store_value(Some(session));

    let on_generate = move |_| {
        let Some(mut current) = session.try_update_value(Option::take).flatten() else {
            leptos::logging::warn!("{}", StudioError::Busy);
            return;
        };
        let gateway = browser_gateway(api_key.get_untracked());
        let topic = topic.get_untracked();
        let mode = mode.get_untracked();
        spawn_local(async move {
            let mut watcher = SignalWatcher { state: set_state };
            if let Err(e) = current.start_run(&gateway, &topic, mode, &mut watcher).await {
                leptos::logging::error!("Generation run failed: {}", e);
            }
            session.set_value(Some(current));
        });
    };

    let on_blog = move |_| {
        if blog_pending.get_untracked() {
            return;
        }
        set_blog_pending.set(true);
        let gateway = browser_gateway(api_key.get_untracked());
        spawn_local(async move {
            match gateway.generate_blog_post().await {
                Ok(post) => set_blog.set(Some(post)),
                Err(e) => leptos::logging::error!("Blog generation failed: {}", e),
            }
            set_blog_pending.set(false);
        });
    };

    let on_save_links = move |_| {
        let store = store.clone();
        let current = links.get_untracked();
        spawn_local(async move {
            if let Err(e) = store.save_social_links(&current).await {
                leptos::logging::error!("Failed to save links: {:?}", e);
            }
        });
    };

    let view_of = move || state.with(|s| s.view);
    let select = move |v: View| set_state.update(|s| s.view = v);

    view! {
        <nav class="tabs">
            {View::ALL.into_iter().map(|v| view! {
                <button
                    class=move || if view_of() == v { "tab active" } else { "tab" }
                    on:click=move |_| select(v)
                >
                    {v.label()}
                </button>
            }).collect_view()}
        </nav>

        <main>
            <Show when=move || view_of() == View::Dashboard>
                <section class="dashboard">
                    <h2>"ابدأ جني الأرباح " <span class="accent">"بضغطة زر واحدة."</span></h2>
                    <input
                        type="text"
                        prop:value=move || topic.get()
                        on:input=move |ev| set_topic.set(event_target_value(&ev))
                    />
                    <select on:change=move |ev| {
                        if let Some(m) = StoryMode::parse(&event_target_value(&ev)) {
                            set_mode.set(m);
                        }
                    }>
                        {StoryMode::ALL.into_iter().map(|m| view! {
                            <option value=m.as_str() selected=move || mode.get() == m>{m.label()}</option>
                        }).collect_view()}
                    </select>
                    <button
                        class="primary"
                        disabled=move || !state.with(|s| s.can_start())
                        on:click=on_generate.clone()
                    >
                        {move || if state.with(|s| s.can_start()) { "🚀 توليد قصة الآن" } else { "⏳ جاري العمل..." }}
                    </button>
                    <Show when=move || state.with(|s| s.status != GenerationStatus::Idle)>
                        <div class="progress">
                            <div class="bar" style:width=move || format!("{}%", state.with(|s| s.progress))></div>
                        </div>
                        <p class="progress-label">
                            {move || format!("Progress: {}%", state.with(|s| s.rounded_progress()))}
                        </p>
                    </Show>
                    <button disabled=move || blog_pending.get() on:click=on_blog>
                        {move || if blog_pending.get() { "⏳ جاري كتابة المقال..." } else { "✍️ مقال بلوجر" }}
                    </button>
                    {move || blog.get().map(|post| view! {
                        <article class="blog">
                            <h3>{post.title}</h3>
                            <p class="seo">{post.seo.description}</p>
                            <div class="tags">
                                {post.tags.into_iter().map(|t| view! { <span>{format!("#{}", t)}</span> }).collect_view()}
                            </div>
                            <div class="content" inner_html=post.content></div>
                            <p class="keywords">{post.seo.keywords.join(", ")}</p>
                        </article>
                    })}
                </section>
            </Show>

            <Show when=move || view_of() == View::Studio>
                {move || match state.with(|s| s.story.clone()) {
                    Some(story) => view! {
                        <section class="studio">
                            <header>
                                <h3>{story.title.clone()}</h3>
                                <button on:click=move |_| select(View::Revenue)>"خطط الربح 💰"</button>
                            </header>
                            {story.scenes.into_iter().map(|scene| {
                                let audio = scene.audio_data.clone().filter(|a| !a.is_empty());
                                view! {
                                    <article class="scene">
                                        <img src=scene.video_url.clone().unwrap_or_default()/>
                                        <h4>{scene.title.clone()}</h4>
                                        <p>{scene.narration.clone()}</p>
                                        {audio.map(|a| view! {
                                            <button on:click=move |_| play_narration(&a)>"▶️ استماع للتعليق الصوتي"</button>
                                        })}
                                    </article>
                                }
                            }).collect_view()}
                        </section>
                    }.into_view(),
                    None => view! {
                        <p class="empty">"لم تكتشف أي كنوز بعد. ابدأ بصناعة قصة!"</p>
                    }.into_view(),
                }}
            </Show>

            <Show when=move || view_of() == View::Revenue>
                {move || {
                    let summary = state.with(|s| RevenueSummary::from_story(s.story.as_ref()));
                    view! {
                        <section class="revenue">
                            <div class="card">
                                <h3>"يوتيوب (YouTube Kids)"</h3>
                                <p>{format!("النيش: {} | CPM المتوقع: {}", summary.niche, summary.cpm_range)}</p>
                                <div class="tags">
                                    {summary.youtube_tags.into_iter().map(|t| view! { <span>{format!("#{}", t)}</span> }).collect_view()}
                                </div>
                            </div>
                            <div class="card">
                                <h3>"التسويق بالعمولة (Affiliate)"</h3>
                                {summary.affiliate_products.into_iter().map(|p| view! { <div class="product">{format!("🛒 {}", p)}</div> }).collect_view()}
                            </div>
                        </section>
                    }
                }}
            </Show>

            <Show when=move || view_of() == View::ApkExport>
                {move || {
                    let href = window().location().href().unwrap_or_default();
                    let info = ApkExportInfo::new(&href);
                    let app_name = info.app_name.clone();
                    let website_url = info.website_url.clone();
                    view! {
                        <section class="apk">
                            <h2>"بيانات التحويل إلى APK"</h2>
                            <label>"1. اسم التطبيق (App Name)"</label>
                            <input type="text" readonly=true value=info.app_name/>
                            <button on:click=move |_| copy_text(app_name.clone())>"نسخ"</button>
                            <label>"2. رابط الموقع (Website URL)"</label>
                            <input type="text" readonly=true value=info.website_url/>
                            <button on:click=move |_| copy_text(website_url.clone())>"نسخ"</button>
                            <p>"3. ضع إيميلك الشخصي في موقع التحويل لتستلم التطبيق عليه."</p>
                            <a href=info.converter_url target="_blank">"فتح موقع التحويل مجاناً"</a>
                        </section>
                    }
                }}
            </Show>

            <Show when=move || view_of() == View::Settings>
                <section class="settings">
                    <label>"API Key"</label>
                    <input
                        type="password"
                        prop:value=move || api_key.get()
                        on:input=move |ev| set_api_key.set(event_target_value(&ev))
                    />
                    <label>"Blogger"</label>
                    <input
                        type="url"
                        prop:value=move || links.with(|l| l.blogger.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            set_links.update(|l| l.blogger = value);
                        }
                    />
                    <button on:click=on_save_links.clone()>"حفظ"</button>
                </section>
            </Show>
        </main>
    }
}
