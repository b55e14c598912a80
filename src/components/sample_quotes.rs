use leptos::prelude::*;

use crate::components::force_graph::SampleQuote;

/// Quotes attached to the graph data, with sentiment and context badges when
/// the extractor supplied them.
#[component]
pub fn SampleQuotes(#[prop(into)] quotes: Signal<Vec<SampleQuote>>) -> impl IntoView {
	view! {
		<Show when=move || quotes.with(|q| !q.is_empty())>
			<div class="sample-quotes">
				<h2>"🎭 Sample Dialogues, Sentiment & Context"</h2>
				<ul>
					{move || {
						quotes
							.get()
							.into_iter()
							.map(|q| {
								view! {
									<li class="quote">
										<div class="quote-character">{q.character}</div>
										<div class="quote-line">{format!("\"{}\"", q.line)}</div>
										<div class="quote-badges">
											{q
												.sentiment
												.map(|s| {
													view! { <span class="badge sentiment">{format!("Sentiment: {s}")}</span> }
												})}
											{q
												.context
												.map(|c| {
													view! { <span class="badge context">{format!("Context: {c}")}</span> }
												})}
										</div>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</div>
		</Show>
	}
}
