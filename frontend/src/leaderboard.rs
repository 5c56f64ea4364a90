use leptos::prelude::*;

use crate::{api, use_board};

#[component]
pub fn LeaderboardPage() -> impl IntoView {
    let refresh = use_board().refresh;
    let rows = LocalResource::new(move || {
        refresh.track();
        api::fetch_leaderboard()
    });

    view! {
        <div id="leaderboard" class="space-y-6">
            <h1 class="text-3xl font-bold">"Leaderboard"</h1>
            <div class="bg-slate-900 border border-slate-800 rounded-xl overflow-hidden">
                <table class="w-full text-left border-collapse">
                    <thead>
                        <tr class="bg-slate-800/50">
                            <th class="px-6 py-4 font-semibold text-slate-300">"Submitted"</th>
                            <th class="px-6 py-4 font-semibold text-slate-300">"Name"</th>
                            <th class="px-6 py-4 font-semibold text-slate-300">"Dataset"</th>
                            <th class="px-6 py-4 font-semibold text-slate-300">"Model"</th>
                            <th class="px-6 py-4 font-semibold text-slate-300">"Result"</th>
                        </tr>
                    </thead>
                    <tbody class="divide-y divide-slate-800">
                        <Suspense fallback=|| view! { <tr><td colspan="5" class="px-6 py-10 text-center text-slate-500">"Loading..."</td></tr> }>
                            {move || Suspend::new(async move {
                                match rows.await {
                                    Ok(rows) if rows.is_empty() => view! {
                                        <tr><td colspan="5" class="px-6 py-10 text-center text-slate-500">"No submissions yet."</td></tr>
                                    }.into_any(),
                                    Ok(rows) => rows.into_iter().map(|row| {
                                        let submitted = row
                                            .submitted_at
                                            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M, %d %b, %Y").to_string())
                                            .unwrap_or_else(|| row.id.clone());
                                        view! {
                                            <tr class="hover:bg-slate-800/30 transition-colors">
                                                <td class="px-6 py-4 text-slate-400 text-sm">{submitted}</td>
                                                <td class="px-6 py-4 font-medium">{row.name}</td>
                                                <td class="px-6 py-4 text-slate-300">{row.dataset}</td>
                                                <td class="px-6 py-4 text-slate-300">{row.model_type}</td>
                                                <td class="px-6 py-4 font-mono text-sm">
                                                    <span class="text-slate-500 mr-2">{row.metric_name}</span>
                                                    {row.metric}
                                                </td>
                                            </tr>
                                        }
                                    }).collect_view().into_any(),
                                    Err(e) => {
                                        log::error!("Failed to load leaderboard: {}", e);
                                        view! {
                                            <tr><td colspan="5" class="px-6 py-10 text-center text-red-400">{format!("Could not load leaderboard: {}", e)}</td></tr>
                                        }.into_any()
                                    }
                                }
                            })}
                        </Suspense>
                    </tbody>
                </table>
            </div>
        </div>
    }
}
