use leptos::prelude::*;

use super::aggregate::{aggregate, format_line};
use crate::components::force_graph::GraphData;

/// Ranked list of who each character interacts with, most frequent first.
#[component]
pub fn CharacterNetwork(#[prop(into)] data: Signal<GraphData>) -> impl IntoView {
	let lines = Memo::new(move |_| data.with(|d| aggregate(&d.nodes, &d.links)));
	let is_empty = move || data.with(|d| d.nodes.is_empty() || d.links.is_empty());

	view! {
		<div class="character-network">
			<h2>"🔗 Character Network"</h2>
			<Show
				when=move || !is_empty()
				fallback=|| view! { <p class="muted">"No character data available."</p> }
			>
				<ul class="network-list">
					{move || {
						lines
							.get()
							.iter()
							.map(|line| view! { <li>{format_line(line)}</li> })
							.collect_view()
					}}
				</ul>
			</Show>
		</div>
	}
}
