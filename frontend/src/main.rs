mod api;
mod chart;
mod leaderboard;
mod share;
mod storage;
mod train;

use std::collections::BTreeSet;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use lucide_leptos::{CircleAlert, Dumbbell, Info as InfoIcon, Share2, TriangleAlert, Trophy, X};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use trainboard_core::{AppConfig, AppContext, NoticeLevel, Section, Summary};

use crate::storage::BrowserStorage;

const NOTICE_TIMEOUT_MS: u32 = 6000;

/// Shared page state, provided once by [`App`].
#[derive(Clone, Copy)]
pub struct Board {
    pub ctx: RwSignal<AppContext<BrowserStorage>, LocalStorage>,
    /// Summary of the stored record, rendered when the share page opens.
    pub summary: RwSignal<Summary>,
    /// Bumped after each submission write so the leaderboard refetches.
    pub refresh: RwSignal<u32>,
}

impl Board {
    pub fn open_section(self, section: Section) {
        if section == Section::Share {
            if let Some(summary) = self.ctx.try_update(|c| c.render_summary()) {
                self.summary.set(summary);
            }
        }
        self.ctx.update(|c| c.show_section(section));
    }
}

pub fn use_board() -> Board {
    use_context::<Board>().expect("Board not provided")
}

pub fn seeded_rng() -> SmallRng {
    SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64)
}

#[component]
fn App() -> impl IntoView {
    let mut context = AppContext::new(BrowserStorage::local(), AppConfig::default());
    context.initialize();

    let board = Board {
        ctx: RwSignal::new_local(context),
        summary: RwSignal::new(Summary::default()),
        refresh: RwSignal::new(0),
    };
    provide_context(board);

    on_cleanup(move || {
        board.ctx.try_update(|c| c.teardown());
    });

    spawn_local(async move {
        match api::fetch_config().await {
            Ok(info) => {
                log::info!("Connected to trainboard {}", info.version);
                board.ctx.try_update(|c| {
                    c.set_config(AppConfig {
                        training_endpoint: info.training_endpoint,
                    })
                });
            }
            Err(e) => log::warn!("Could not load server config, using defaults: {}", e),
        }
    });

    let section = Memo::new(move |_| board.ctx.with(|c| c.form().section()));

    view! {
        <div class="min-h-screen bg-slate-950 text-slate-100 font-sans">
            <nav class="flex items-center space-x-2 px-8 py-4 border-b border-slate-800 bg-slate-900/50">
                <span class="text-2xl font-bold tracking-tight text-white mr-6">"Trainboard"</span>
                <NavTab section=Section::Train label="Train" current=section>
                    <Dumbbell size=18 />
                </NavTab>
                <NavTab section=Section::Share label="Share" current=section>
                    <Share2 size=18 />
                </NavTab>
                <NavTab section=Section::Leaderboard label="Leaderboard" current=section>
                    <Trophy size=18 />
                </NavTab>
            </nav>

            <NoticeList />

            <main class="p-8 max-w-5xl mx-auto">
                {move || match section.get() {
                    Section::Train => view! { <train::TrainPage /> }.into_any(),
                    Section::Share => view! { <share::SharePage /> }.into_any(),
                    Section::Leaderboard => view! { <leaderboard::LeaderboardPage /> }.into_any(),
                }}
            </main>
        </div>
    }
}

#[component]
fn NavTab(
    section: Section,
    label: &'static str,
    current: Memo<Section>,
    children: Children,
) -> impl IntoView {
    let board = use_board();
    view! {
        <button
            id=format!("{}-tab", section.id())
            on:click=move |_| board.open_section(section)
            class=move || format!(
                "flex items-center space-x-2 px-4 py-2 rounded-xl transition-all duration-200 {}",
                if current.get() == section { "bg-slate-800 text-white" } else { "text-slate-400 hover:text-white hover:bg-slate-800/50" }
            )
        >
            {children()}
            <span class="font-medium">{label}</span>
        </button>
    }
}

#[component]
fn NoticeList() -> impl IntoView {
    let board = use_board();
    let scheduled = StoredValue::new_local(BTreeSet::<u64>::new());

    // Each notice gets one dismissal timer.
    Effect::new(move |_| {
        let ids: Vec<u64> = board.ctx.with(|c| c.notices().iter().map(|n| n.id).collect());
        for id in ids {
            if scheduled.try_update_value(|s| s.insert(id)).unwrap_or(false) {
                spawn_local(async move {
                    TimeoutFuture::new(NOTICE_TIMEOUT_MS).await;
                    board.ctx.try_update(|c| c.dismiss_notice(id));
                });
            }
        }
    });

    view! {
        <div class="fixed top-4 right-4 z-50 space-y-2 w-96">
            <For
                each=move || board.ctx.with(|c| c.notices().iter().cloned().collect::<Vec<_>>())
                key=|n| n.id
                children=move |notice| {
                    let id = notice.id;
                    let (tone, icon) = match notice.level {
                        NoticeLevel::Info => ("border-blue-800 bg-blue-950/80 text-blue-200", view! { <InfoIcon size=18 /> }.into_any()),
                        NoticeLevel::Warning => ("border-amber-800 bg-amber-950/80 text-amber-200", view! { <TriangleAlert size=18 /> }.into_any()),
                        NoticeLevel::Error => ("border-red-800 bg-red-950/80 text-red-200", view! { <CircleAlert size=18 /> }.into_any()),
                    };
                    view! {
                        <div class=format!("flex items-start space-x-3 p-4 rounded-xl border shadow-lg {}", tone)>
                            {icon}
                            <span class="flex-grow text-sm">{notice.message}</span>
                            <button
                                class="opacity-60 hover:opacity-100"
                                on:click=move |_| board.ctx.update(|c| c.dismiss_notice(id))
                            >
                                <X size=16 />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

fn main() {
    let level = if storage::debug_enabled() {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    _ = console_log::init_with_level(level);
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
