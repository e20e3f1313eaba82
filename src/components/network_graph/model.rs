//! Builds the typed node/edge element set from the raw entity and edge
//! lists, applying the active filter mode. Side-effect-free; safe to call
//! on every structural input change.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::types::{
	ClusterData, EdgeKind, Entity, EntityType, FilterMode, GraphEdge, GraphNode, NodeKind, Point,
};

/// Returns the two ids as a deterministic unordered key.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
	if a <= b {
		(a.to_owned(), b.to_owned())
	} else {
		(b.to_owned(), a.to_owned())
	}
}

/// An unordered namespace pair that needs a routed inter-namespace edge,
/// with the number of logical links bundled into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespacePair {
	pub a: String,
	pub b: String,
	pub count: usize,
}

impl NamespacePair {
	pub fn touches(&self, namespace: &str) -> bool {
		self.a == namespace || self.b == namespace
	}
}

/// The element set ready for layout. Deployment positions are filled in by
/// the layout engine; inter-namespace edges are routed by the pairing
/// engine from `namespace_pairs`.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub namespaces: Vec<GraphNode>,
	pub deployments: Vec<GraphNode>,
	pub intra_edges: Vec<GraphEdge>,
	pub namespace_pairs: Vec<NamespacePair>,
}

impl GraphModel {
	pub fn deployment_ids_in(&self, namespace: &str) -> Vec<String> {
		self.deployments
			.iter()
			.filter(|node| node.parent.as_deref() == Some(namespace))
			.map(|node| node.id.clone())
			.collect()
	}
}

fn keep_entity(entity: &Entity, filter: FilterMode) -> bool {
	entity.entity_type == EntityType::Deployment
		&& (filter != FilterMode::Active || entity.active)
}

fn keep_edge(edge: &super::types::LogicalEdge, filter: FilterMode) -> bool {
	match filter {
		FilterMode::All => true,
		FilterMode::Active => edge.active,
		FilterMode::Allowed => edge.allowed,
	}
}

/// Builds the model for the given filter mode. Edges referencing a
/// filtered-out or unknown entity id are dropped: the entity and edge feeds
/// are updated independently and expected to skew.
pub fn build_model(data: &ClusterData, filter: FilterMode) -> GraphModel {
	let entities: Vec<&Entity> = data
		.entities
		.iter()
		.filter(|entity| keep_entity(entity, filter))
		.collect();
	let by_id: HashMap<&str, &Entity> =
		entities.iter().map(|entity| (entity.id.as_str(), *entity)).collect();

	// group survivors by namespace, deterministically ordered
	let mut grouped: BTreeMap<&str, Vec<&Entity>> = BTreeMap::new();
	for entity in &entities {
		grouped.entry(entity.namespace.as_str()).or_default().push(*entity);
	}

	let namespaces = grouped
		.keys()
		.map(|namespace| GraphNode {
			id: (*namespace).to_owned(),
			kind: NodeKind::Namespace,
			name: (*namespace).to_owned(),
			parent: None,
			active: grouped[namespace].iter().any(|entity| entity.active),
			side: None,
			position: Point::default(),
		})
		.collect();

	let deployments = grouped
		.values()
		.flatten()
		.map(|entity| GraphNode {
			id: entity.id.clone(),
			kind: NodeKind::Deployment,
			name: entity.name.clone(),
			parent: Some(entity.namespace.clone()),
			active: entity.active,
			side: None,
			position: Point::default(),
		})
		.collect();

	let mut intra_edges = Vec::new();
	let mut seen_intra: HashSet<(String, String)> = HashSet::new();
	let mut pair_counts: BTreeMap<(String, String), usize> = BTreeMap::new();

	for edge in data.edges.iter().filter(|edge| keep_edge(edge, filter)) {
		let (Some(source), Some(target)) =
			(by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
		else {
			continue;
		};
		if source.namespace == target.namespace {
			if seen_intra.insert(pair_key(&source.id, &target.id)) {
				intra_edges.push(GraphEdge {
					id: format!("{}->{}", source.id, target.id),
					source: source.id.clone(),
					target: target.id.clone(),
					kind: EdgeKind::IntraNamespace,
					count: 1,
				});
			}
		} else {
			*pair_counts
				.entry(pair_key(&source.namespace, &target.namespace))
				.or_default() += 1;
		}
	}

	let namespace_pairs = pair_counts
		.into_iter()
		.map(|((a, b), count)| NamespacePair { a, b, count })
		.collect();

	GraphModel {
		namespaces,
		deployments,
		intra_edges,
		namespace_pairs,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::types::LogicalEdge;

	fn entity(id: &str, namespace: &str, active: bool) -> Entity {
		Entity {
			id: id.to_owned(),
			entity_type: EntityType::Deployment,
			name: id.to_uppercase(),
			namespace: namespace.to_owned(),
			active,
		}
	}

	fn edge(source: &str, target: &str) -> LogicalEdge {
		LogicalEdge {
			source: source.to_owned(),
			target: target.to_owned(),
			active: true,
			allowed: true,
		}
	}

	fn sample() -> ClusterData {
		ClusterData {
			entities: vec![
				entity("a", "ns1", true),
				entity("b", "ns1", false),
				entity("c", "ns2", true),
			],
			edges: vec![edge("a", "b"), edge("b", "c")],
		}
	}

	#[test]
	fn groups_namespaces_and_splits_edge_kinds() {
		let model = build_model(&sample(), FilterMode::All);
		let namespace_ids: Vec<&str> =
			model.namespaces.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(namespace_ids, ["ns1", "ns2"]);
		// ns1 holds one active member, so the container counts as active
		assert!(model.namespaces[0].active);

		assert_eq!(model.intra_edges.len(), 1);
		assert_eq!(model.intra_edges[0].source, "a");
		assert_eq!(model.intra_edges[0].target, "b");
		assert_eq!(model.intra_edges[0].kind, EdgeKind::IntraNamespace);

		// the b->c link crosses namespaces and is deferred to routing
		assert_eq!(
			model.namespace_pairs,
			vec![NamespacePair { a: "ns1".into(), b: "ns2".into(), count: 1 }]
		);
	}

	#[test]
	fn active_filter_drops_inactive_entities_and_their_edges() {
		let model = build_model(&sample(), FilterMode::Active);
		assert!(model.deployments.iter().all(|node| node.id != "b"));
		// both edges touched "b", so nothing survives
		assert!(model.intra_edges.is_empty());
		assert!(model.namespace_pairs.is_empty());
	}

	#[test]
	fn allowed_filter_drops_disallowed_edges_only() {
		let mut data = sample();
		data.edges[0].allowed = false;
		let model = build_model(&data, FilterMode::Allowed);
		assert_eq!(model.deployments.len(), 3);
		assert!(model.intra_edges.is_empty());
		assert_eq!(model.namespace_pairs.len(), 1);
	}

	#[test]
	fn non_deployment_entities_never_become_nodes() {
		let mut data = sample();
		data.entities.push(Entity {
			entity_type: EntityType::External,
			..entity("internet", "ns2", true)
		});
		data.edges.push(edge("a", "internet"));
		let model = build_model(&data, FilterMode::All);
		assert!(model.deployments.iter().all(|node| node.id != "internet"));
		// the edge to it dangles and is dropped with it
		assert_eq!(model.namespace_pairs.len(), 1);
	}

	#[test]
	fn dangling_edge_endpoints_are_dropped_silently() {
		let mut data = sample();
		data.edges.push(edge("a", "ghost"));
		let model = build_model(&data, FilterMode::All);
		assert_eq!(model.intra_edges.len(), 1);
		assert_eq!(model.namespace_pairs.len(), 1);
	}

	#[test]
	fn repeated_builds_are_identical() {
		let data = sample();
		let first = build_model(&data, FilterMode::All);
		let second = build_model(&data, FilterMode::All);
		assert_eq!(first.namespaces, second.namespaces);
		assert_eq!(first.deployments, second.deployments);
		assert_eq!(first.intra_edges, second.intra_edges);
		assert_eq!(first.namespace_pairs, second.namespace_pairs);
	}

	#[test]
	fn duplicate_links_bundle_into_pair_count() {
		let mut data = sample();
		data.edges.push(edge("a", "c"));
		let model = build_model(&data, FilterMode::All);
		assert_eq!(model.namespace_pairs[0].count, 2);
	}
}
