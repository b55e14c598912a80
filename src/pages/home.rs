use leptos::prelude::*;
use log::{info, warn};

use crate::components::character_network::CharacterNetwork;
use crate::components::force_graph::{ForceGraph, GraphData};
use crate::components::sample_quotes::SampleQuotes;

/// Bundled example of what the character extractor produces.
const SAMPLE_GRAPH: &str = include_str!("sample_graph.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let initial = GraphData::from_json(SAMPLE_GRAPH);
	let (graph_data, set_graph_data) = signal(initial.clone().unwrap_or_default());
	let (parse_error, set_parse_error) = signal(initial.err());
	let textarea_ref = NodeRef::<leptos::html::Textarea>::new();

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let Some(textarea) = textarea_ref.get() else {
			return;
		};
		match GraphData::from_json(&textarea.value()) {
			Ok(data) => {
				info!(
					"loaded graph with {} characters and {} links",
					data.nodes.len(),
					data.links.len()
				);
				set_parse_error.set(None);
				set_graph_data.set(data);
			}
			// Keep showing the last good graph.
			Err(err) => {
				warn!("{err}");
				set_parse_error.set(Some(err));
			}
		}
	};

	let data = Signal::from(graph_data);
	let quotes = Signal::derive(move || graph_data.with(|d| d.sample_quotes.clone()));

	view! {
		<div class="page">
			<h1>"Character Interaction Visualizer"</h1>
			<p class="subtitle">
				"Paste the character graph extracted from a book ("
				<code>"nodes"</code>
				", "
				<code>"links"</code>
				" and optional "
				<code>"sampleQuotes"</code>
				") and press Visualize."
			</p>

			<form class="graph-form" on:submit=on_submit>
				<textarea node_ref=textarea_ref name="graphData" rows="12" prop:value=SAMPLE_GRAPH />
				<button type="submit">"Visualize"</button>
			</form>

			<ErrorBoundary fallback=|errors| {
				view! {
					<ul class="error">
						{move || {
							errors
								.get()
								.into_iter()
								.map(|(_, e)| view! { <li>{e.to_string()}</li> })
								.collect_view()
						}}
					</ul>
				}
			}>{move || parse_error.get().map_or(Ok(()), Err)}</ErrorBoundary>

			<SampleQuotes quotes=quotes />
			<CharacterNetwork data=data />
		</div>
		<div class="graph-panel">
			<ForceGraph data=data />
		</div>
	}
}
