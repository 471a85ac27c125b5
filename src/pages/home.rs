use leptos::prelude::*;
use log::{error, info};

use crate::components::force_graph::ForceGraphCanvas;
use crate::graph::{Dataset, GraphVisualizer, Result, VisualizerConfig};

/// Bundled empire used until a live data source is wired in.
const SAMPLE_EMPIRE: &str = include_str!("../../data/empire.json");

fn load_empire() -> Result<GraphVisualizer> {
	let dataset = Dataset::from_json(SAMPLE_EMPIRE)?;
	info!("Sample empire parsed: {} rulers", dataset.nodes.len());
	GraphVisualizer::new(dataset, VisualizerConfig::default()).inspect_err(|e| error!("Refusing to start: {e}"))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let visualizer = load_empire();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="imperial-graph">
				<header class="graph-header">
					<h1>"Imperial hierarchy"</h1>
					<p class="subtitle">
						"Drag rulers to reposition. Scroll to zoom. Drag the background to pan."
					</p>
				</header>
				{visualizer.map(|visualizer| view! { <ForceGraphCanvas visualizer=visualizer height=700.0 /> })}
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_empire_loads() {
		let visualizer = load_empire().unwrap();
		let model = visualizer.model();
		assert!(model.nodes().len() >= 12);
		assert!(model.nodes().iter().all(|n| n.is_placed()));
	}
}
