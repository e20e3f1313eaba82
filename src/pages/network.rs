use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use log::info;

use crate::components::network_graph::{
	ClusterData, Entity, EntityType, FilterMode, LogicalEdge, NetworkGraphCanvas,
};

const NAMESPACES: &[&str] = &["frontend", "backend", "payments", "monitoring", "kube-system"];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Generate a deterministic sample cluster until the data-fetching layer is
/// wired in.
fn sample_cluster() -> ClusterData {
	let mut entities = Vec::new();
	for (ns_index, namespace) in NAMESPACES.iter().enumerate() {
		let count = 3 + (ns_index * 2) % 5;
		for i in 0..count {
			entities.push(Entity {
				id: format!("{namespace}-d{i}"),
				entity_type: EntityType::Deployment,
				name: format!("{namespace}-deploy-{i}"),
				namespace: (*namespace).to_owned(),
				active: rand_simple(ns_index * 31 + i) > 0.4,
			});
		}
	}

	let edges = (0..entities.len() * 2)
		.map(|i| {
			let source = (rand_simple(i * 7) * entities.len() as f64) as usize;
			let target = (rand_simple(i * 13 + 3) * entities.len() as f64) as usize;
			LogicalEdge {
				source: entities[source.min(entities.len() - 1)].id.clone(),
				target: entities[target.min(entities.len() - 1)].id.clone(),
				active: rand_simple(i) > 0.5,
				allowed: rand_simple(i + 17) > 0.3,
			}
		})
		.filter(|edge| edge.source != edge.target)
		.collect();

	ClusterData { entities, edges }
}

/// The network topology page: filter controls plus the graph canvas.
#[component]
pub fn Network() -> impl IntoView {
	let params = use_params_map();
	let selected_id = params.read_untracked().get("deployment_id");
	let (filter, set_filter) = signal(FilterMode::All);
	let data = Signal::derive(sample_cluster);

	let on_node_selected = Callback::new(|id: String| info!("deployment selected: {id}"));
	let on_namespace_selected = Callback::new(|(id, deployments): (String, Vec<String>)| {
		info!("namespace selected: {id} ({} deployments)", deployments.len());
	});
	let on_deselected = Callback::new(|()| info!("selection cleared"));

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

			<div class="fullscreen-graph">
				<NetworkGraphCanvas
					data=data
					filter=filter
					selected_id=selected_id
					on_node_selected=on_node_selected
					on_namespace_selected=on_namespace_selected
					on_deselected=on_deselected
				/>
				<div class="graph-overlay">
					<h1>"Network Graph"</h1>
					<p class="subtitle">
						"Drag deployments to reposition. Scroll to zoom. Drag background to pan."
					</p>
					<div class="graph-filter-controls">
						<button on:click=move |_| set_filter.set(FilterMode::All)>"All"</button>
						<button on:click=move |_| set_filter.set(FilterMode::Active)>"Active"</button>
						<button on:click=move |_| set_filter.set(FilterMode::Allowed)>"Allowed"</button>
					</div>
				</div>
			</div>
		</ErrorBoundary>
	}
}
