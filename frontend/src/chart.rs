//! Plotly rendering of a [`ChartSpec`].

use leptos::prelude::*;
use plotly::{
    common::{Mode, Title},
    layout::Axis,
    Layout, Plot, Scatter,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

use trainboard_core::ChartSpec;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = newPlot)]
    fn new_plot(root: &JsValue, data: &JsValue, layout: &JsValue, config: &JsValue);
}

fn to_plot(spec: &ChartSpec) -> Plot {
    let mut p = Plot::new();
    p.set_layout(
        Layout::new()
            .title(Title::from(spec.title.as_str()))
            .height(spec.height as usize)
            .paper_background_color("rgba(0,0,0,0)")
            .plot_background_color("rgba(0,0,0,0)")
            .font(plotly::common::Font::new().color("#94a3b8"))
            .x_axis(
                Axis::new()
                    .title(Title::from(spec.x_title.as_str()))
                    .grid_color("#1e293b"),
            )
            .y_axis(
                Axis::new()
                    .title(Title::from(spec.y_title.as_str()))
                    .grid_color("#1e293b"),
            ),
    );
    p.add_trace(
        Scatter::new(spec.x.clone(), spec.y.clone())
            .mode(Mode::Lines)
            .name(spec.title.as_str()),
    );
    p
}

#[component]
pub fn LossChart(#[prop(into)] chart: Signal<Option<ChartSpec>>) -> impl IntoView {
    let div_ref = NodeRef::<leptos::html::Div>::new();

    Effect::new(move |_| {
        let (Some(div), Some(spec)) = (div_ref.get(), chart.get()) else {
            return;
        };
        let json_str = to_plot(&spec).to_json();
        match js_sys::JSON::parse(&json_str) {
            Ok(js_value) => {
                let field = |name: &str| {
                    js_sys::Reflect::get(&js_value, &name.into()).unwrap_or(JsValue::UNDEFINED)
                };
                let div_element: &web_sys::HtmlElement = &div;
                new_plot(
                    &div_element.into(),
                    &field("data"),
                    &field("layout"),
                    &field("config"),
                );
            }
            Err(_) => log::error!("Failed to parse Plotly JSON"),
        }
    });

    view! {
        <div id="plotly-graph" node_ref=div_ref class="w-full"></div>
    }
}
