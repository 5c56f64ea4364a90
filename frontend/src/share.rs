//! The share section: summary of the last extracted record and the
//! submission form.

use leptos::prelude::*;
use leptos::task::spawn_local;
use lucide_leptos::Send as SendIcon;

use trainboard_core::summary::NO_DETAILS;

use crate::{api, use_board};

#[component]
pub fn SharePage() -> impl IntoView {
    let board = use_board();
    let ctx = board.ctx;
    let summary = board.summary;

    let submit = move |_| {
        let Some(pending) = ctx.try_update(|c| c.finalize_submission()) else {
            return;
        };
        spawn_local(async move {
            let outcome = api::put_document(&pending.document).await;
            let ok = outcome.is_ok();
            ctx.try_update(|c| c.complete_document_write(pending.task, outcome));
            if ok {
                board.refresh.update(|n| *n += 1);
            }
        });
    };

    view! {
        <div id="share" class="space-y-6">
            <h1 class="text-3xl font-bold">"Share your result"</h1>

            <div class="bg-slate-900 border border-slate-800 rounded-2xl p-6 space-y-3">
                <div class="grid grid-cols-3 gap-4">
                    <SummaryField label="Dataset" id="summary-dataset" value=Signal::derive(move || summary.get().dataset) />
                    <SummaryField label="Model" id="summary-model" value=Signal::derive(move || summary.get().model_type) />
                    <SummaryField label="Test accuracy" id="summary-accuracy" value=Signal::derive(move || summary.get().accuracy) />
                </div>
                <div>
                    <p class="text-sm text-slate-400 mb-1">"Details"</p>
                    <ul id="summary-details" class="text-sm font-mono text-slate-300 space-y-0.5">
                        {move || summary.get().detail_lines().into_iter().map(|line| {
                            let muted = line == NO_DETAILS;
                            view! { <li class:text-slate-500=muted>{line}</li> }
                        }).collect_view()}
                    </ul>
                </div>
            </div>

            <div class="bg-slate-900 border border-slate-800 rounded-2xl p-6 space-y-4">
                <TextField id="name-field" label="Your name"
                    value=Signal::derive(move || ctx.with(|c| c.form().submission.name.clone()))
                    on_input=Callback::new(move |v: String| ctx.update(|c| c.form_mut().submission.name = v)) />
                <TextField id="model-tuning-field" label="How did you tune the model?"
                    value=Signal::derive(move || ctx.with(|c| c.form().submission.model_tuning.clone()))
                    on_input=Callback::new(move |v: String| ctx.update(|c| c.form_mut().submission.model_tuning = v)) />
                <TextField id="model-improvement-field" label="What would you improve?"
                    value=Signal::derive(move || ctx.with(|c| c.form().submission.improvement.clone()))
                    on_input=Callback::new(move |v: String| ctx.update(|c| c.form_mut().submission.improvement = v)) />

                <button
                    id="submit-button"
                    class="flex items-center space-x-2 px-5 py-2 bg-blue-600 hover:bg-blue-500 rounded-lg font-medium"
                    on:click=submit
                >
                    <SendIcon size=16 />
                    <span>"Submit"</span>
                </button>
            </div>
        </div>
    }
}

#[component]
fn SummaryField(label: &'static str, id: &'static str, value: Signal<String>) -> impl IntoView {
    view! {
        <div>
            <p class="text-sm text-slate-400">{label}</p>
            <p id=id class="text-lg text-white">{move || value.get()}</p>
        </div>
    }
}

#[component]
fn TextField(
    id: &'static str,
    label: &'static str,
    value: Signal<String>,
    on_input: Callback<String>,
) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <label class="block text-sm text-slate-400" for=id>{label}</label>
            <textarea
                id=id
                rows="2"
                class="w-full bg-slate-800 border border-slate-700 rounded-lg px-3 py-2"
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            ></textarea>
        </div>
    }
}
