//! The train section: dataset selector, model panels, results and chart.

use leptos::prelude::*;
use leptos::task::spawn_local;
use lucide_leptos::{Play, Share2};

use trainboard_core::catalog::{self, FieldKind, FieldSpec};
use trainboard_core::{Dataset, ModelType, ResultView, Section};

use crate::chart::LossChart;
use crate::{api, seeded_rng, use_board};

#[component]
pub fn TrainPage() -> impl IntoView {
    let board = use_board();
    let ctx = board.ctx;

    let train = move |_| {
        let mut rng = seeded_rng();
        let Some(Some(request)) = ctx.try_update(|c| c.start_training(&mut rng)) else {
            return;
        };
        spawn_local(async move {
            let outcome = api::create_model(&request.endpoint, &request.record).await;
            ctx.try_update(|c| c.complete_remote_training(request.task, outcome));
        });
    };

    let share = move |_| {
        ctx.update(|c| {
            c.extract();
        });
        board.open_section(Section::Share);
    };

    let chart = Signal::derive(move || ctx.with(|c| c.form().chart().cloned()));

    view! {
        <div id="train" class="space-y-6">
            <h1 class="text-3xl font-bold">"Train a model"</h1>

            <div class="bg-slate-900 border border-slate-800 rounded-2xl p-6 space-y-4">
                <label class="block text-sm font-medium text-slate-400" for="dataset-select">"Dataset"</label>
                <select
                    id="dataset-select"
                    class="w-full bg-slate-800 border border-slate-700 rounded-lg px-3 py-2"
                    prop:value=move || ctx.with(|c| c.form().dataset().value())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        ctx.update(|c| c.change_dataset(&value));
                    }
                >
                    {Dataset::ALL.into_iter().map(|d| view! {
                        <option value=d.value()>{d.display_name()}</option>
                    }).collect_view()}
                </select>

                {Dataset::ALL.into_iter().map(|d| view! { <FeaturePanel dataset=d /> }).collect_view()}
            </div>

            <div class="flex flex-wrap gap-3">
                {ModelType::ALL.into_iter().map(|m| view! {
                    <button
                        id=m.button_id()
                        class:hidden=move || !ctx.with(|c| c.form().buttons().is_visible(m))
                        class=move || format!(
                            "px-4 py-2 rounded-lg border transition-colors {}",
                            if ctx.with(|c| c.form().active_model() == Some(m)) {
                                "bg-blue-600 border-blue-500 text-white"
                            } else {
                                "bg-slate-900 border-slate-700 text-slate-300 hover:bg-slate-800"
                            }
                        )
                        on:click=move |_| ctx.update(|c| c.select_model(m.key()))
                    >
                        {catalog::model_label(m)}
                    </button>
                }).collect_view()}
            </div>

            {ModelType::ALL.into_iter().map(|m| view! { <HyperparameterPanel model=m /> }).collect_view()}

            <div class="flex space-x-3">
                <button
                    id="train-button"
                    class="flex items-center space-x-2 px-5 py-2 bg-blue-600 hover:bg-blue-500 rounded-lg font-medium"
                    on:click=train
                >
                    <Play size=16 />
                    <span>"Train"</span>
                </button>
                <button
                    id="share-button"
                    class="flex items-center space-x-2 px-5 py-2 bg-slate-800 hover:bg-slate-700 rounded-lg font-medium"
                    on:click=share
                >
                    <Share2 size=16 />
                    <span>"Share result"</span>
                </button>
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                <ResultBox kind=ResultView::Loss label="Loss" />
                <ResultBox kind=ResultView::Accuracy label="Test accuracy" />
            </div>

            <div class="bg-slate-900 border border-slate-800 rounded-2xl p-4">
                <LossChart chart=chart />
            </div>
        </div>
    }
}

#[component]
fn ResultBox(kind: ResultView, label: &'static str) -> impl IntoView {
    let ctx = use_board().ctx;
    let text = move || {
        ctx.with(|c| {
            let form = c.form();
            match kind {
                ResultView::Loss => form.loss_text(),
                ResultView::Accuracy => form.accuracy_text(),
            }
            .unwrap_or("-")
            .to_string()
        })
    };
    let text_id = match kind {
        ResultView::Loss => "loss",
        ResultView::Accuracy => "test-accuracy",
    };

    view! {
        <div
            id=kind.container_id()
            class:hidden=move || ctx.with(|c| c.form().result_view() != kind)
            class="bg-slate-900 border border-slate-800 rounded-xl p-6"
        >
            <p class="text-sm text-slate-400">{label}</p>
            <p id=text_id class="text-3xl font-mono text-white">{text}</p>
        </div>
    }
}

#[component]
fn HyperparameterPanel(model: ModelType) -> impl IntoView {
    let ctx = use_board().ctx;

    view! {
        <div
            id=model.panel_id()
            class:hidden=move || !ctx.with(|c| c.form().is_model_visible(model))
            class="bg-slate-900 border border-slate-800 rounded-2xl p-6 space-y-4"
        >
            <h2 class="text-lg font-semibold">{catalog::heading(model)}</h2>
            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                {catalog::fields(model).iter().map(|spec| view! { <FieldInput spec=*spec /> }).collect_view()}
            </div>
        </div>
    }
}

#[component]
fn FieldInput(spec: FieldSpec) -> impl IntoView {
    let ctx = use_board().ctx;
    let id = spec.id;
    let value = move || ctx.with(|c| c.form().field_value(id).unwrap_or_default().to_string());
    let on_value = move |ev: leptos::ev::Event| {
        let v = event_target_value(&ev);
        ctx.update(|c| {
            c.form_mut().set_field(id, v);
        });
    };

    let control = match spec.kind {
        FieldKind::Number { min, step } => view! {
            <input
                id=id
                type="number"
                min=min.to_string()
                step=step.to_string()
                class="w-full bg-slate-800 border border-slate-700 rounded-lg px-3 py-2"
                prop:value=value
                on:input=on_value
            />
        }
        .into_any(),
        FieldKind::Select { options } => view! {
            <select
                id=id
                class="w-full bg-slate-800 border border-slate-700 rounded-lg px-3 py-2"
                prop:value=value
                on:change=on_value
            >
                {options.iter().map(|o| view! { <option value=*o>{*o}</option> }).collect_view()}
            </select>
        }
        .into_any(),
    };

    view! {
        <div class="space-y-1">
            <label class="block text-sm text-slate-400" for=id>{spec.label}</label>
            {control}
        </div>
    }
}

#[component]
fn FeaturePanel(dataset: Dataset) -> impl IntoView {
    let ctx = use_board().ctx;

    view! {
        <div
            id=dataset.features_panel_id()
            class:hidden=move || !ctx.with(|c| c.form().is_features_visible(dataset))
            class="flex flex-wrap gap-4 pt-2"
        >
            {catalog::features(dataset).iter().map(|f| {
                let id = f.id;
                view! {
                    <label class="flex items-center space-x-2 text-sm text-slate-300">
                        <input
                            id=id
                            type="checkbox"
                            prop:checked=move || ctx.with(|c| c.form().is_checked(id))
                            on:change=move |ev| {
                                let checked = event_target_checked(&ev);
                                ctx.update(|c| {
                                    c.form_mut().set_checked(id, checked);
                                });
                            }
                        />
                        <span>{f.label}</span>
                    </label>
                }
            }).collect_view()}
        </div>
    }
}
