//! Chooses, for each namespace pair that needs a routed edge, the
//! minimum-distance pair of complementary boundary ("side") nodes, and keeps
//! that choice cheap to update while a namespace is dragged.

use std::collections::{BTreeMap, HashMap};

use super::model::{NamespacePair, pair_key};
use super::types::{EdgeKind, GraphEdge, GraphNode, NodeKind, Point, Rect, Side};

/// A candidate routing anchor on one boundary of a namespace container.
#[derive(Clone, Debug, PartialEq)]
pub struct SideNode {
	pub id: String,
	pub namespace: String,
	pub side: Side,
	pub position: Point,
}

pub fn side_node_id(namespace: &str, side: Side) -> String {
	format!("{}::{}", namespace, side.label())
}

/// The four candidate anchors for a namespace, at the midpoint of each
/// boundary, flush with the container edge.
pub fn side_anchors(namespace: &str, rect: Rect) -> Vec<SideNode> {
	let center = rect.center();
	Side::ALL
		.iter()
		.map(|&side| {
			let position = match side {
				Side::Top => Point { x: center.x, y: rect.y },
				Side::Bottom => Point { x: center.x, y: rect.y + rect.height },
				Side::Left => Point { x: rect.x, y: center.y },
				Side::Right => Point { x: rect.x + rect.width, y: center.y },
			};
			SideNode {
				id: side_node_id(namespace, side),
				namespace: namespace.to_owned(),
				side,
				position,
			}
		})
		.collect()
}

/// The cached minimum-distance solution for one unordered namespace pair.
/// `source_side` and `target_side` are always complementary.
#[derive(Clone, Debug, PartialEq)]
pub struct SidePairing {
	pub namespace_a: String,
	pub namespace_b: String,
	pub source_side_id: String,
	pub target_side_id: String,
	pub source_side: Side,
	pub target_side: Side,
	pub distance: f64,
}

/// Owns the pairing cache and the side-node distance cache. No other
/// component mutates either; entries persist across drags of unrelated
/// namespaces and are evicted only for the namespace that moved.
#[derive(Debug, Default)]
pub struct PairingEngine {
	pairings: BTreeMap<(String, String), SidePairing>,
	distances: HashMap<(String, String), f64>,
}

impl PairingEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn pairing(&self, a: &str, b: &str) -> Option<&SidePairing> {
		self.pairings.get(&pair_key(a, b))
	}

	pub fn pairings(&self) -> impl Iterator<Item = &SidePairing> {
		self.pairings.values()
	}

	#[cfg(test)]
	pub fn cached_distances(&self) -> usize {
		self.distances.len()
	}

	/// Full recomputation over every required pair. Invoked once per
	/// structural change, when all positions are new.
	pub fn recompute(
		&mut self,
		side_nodes: &BTreeMap<String, Vec<SideNode>>,
		pairs: &[NamespacePair],
	) {
		self.distances.clear();
		self.pairings.clear();
		for pair in pairs {
			self.compute_pair(side_nodes, &pair.a, &pair.b);
		}
	}

	/// Incremental recomputation scoped to the namespace that moved. Pairs
	/// not touching it keep their cached pairing untouched.
	pub fn recompute_for(
		&mut self,
		moved: &str,
		side_nodes: &BTreeMap<String, Vec<SideNode>>,
		pairs: &[NamespacePair],
	) {
		self.evict_namespace(moved);
		for pair in pairs.iter().filter(|pair| pair.touches(moved)) {
			self.compute_pair(side_nodes, &pair.a, &pair.b);
		}
	}

	/// Drops cached distances for the moved namespace's side nodes. The
	/// cache is never invalidated implicitly.
	fn evict_namespace(&mut self, namespace: &str) {
		let victims = Side::ALL.map(|side| side_node_id(namespace, side));
		self.distances
			.retain(|(a, b), _| !victims.contains(a) && !victims.contains(b));
	}

	fn compute_pair(
		&mut self,
		side_nodes: &BTreeMap<String, Vec<SideNode>>,
		a: &str,
		b: &str,
	) {
		let key = pair_key(a, b);
		let (Some(sources), Some(targets)) = (side_nodes.get(a), side_nodes.get(b)) else {
			self.pairings.remove(&key);
			return;
		};
		match self.best_pair(a, b, sources, targets) {
			Some(pairing) => {
				self.pairings.insert(key, pairing);
			}
			None => {
				// no complementary side available; the edge is simply not
				// routed for this pair
				self.pairings.remove(&key);
			}
		}
	}

	fn best_pair(
		&mut self,
		a: &str,
		b: &str,
		sources: &[SideNode],
		targets: &[SideNode],
	) -> Option<SidePairing> {
		let mut shortest: Option<SidePairing> = None;
		for source in sources {
			let Some(target) = targets
				.iter()
				.find(|target| target.side == source.side.complement())
			else {
				continue;
			};
			let distance = self.distance(source, target);
			// strict comparison: ties keep the first-seen candidate
			if shortest.as_ref().is_none_or(|p| p.distance > distance) {
				shortest = Some(SidePairing {
					namespace_a: a.to_owned(),
					namespace_b: b.to_owned(),
					source_side_id: source.id.clone(),
					target_side_id: target.id.clone(),
					source_side: source.side,
					target_side: target.side,
					distance,
				});
			}
		}
		shortest
	}

	fn distance(&mut self, source: &SideNode, target: &SideNode) -> f64 {
		let key = pair_key(&source.id, &target.id);
		if let Some(&cached) = self.distances.get(&key) {
			return cached;
		}
		let dx = source.position.x - target.position.x;
		let dy = source.position.y - target.position.y;
		let distance = (dx * dx + dy * dy).sqrt();
		self.distances.insert(key, distance);
		distance
	}

	/// Materializes the side nodes used by the current pairings and one
	/// inter-namespace edge per routed pair, replacing whatever edges
	/// connected the pair before.
	pub fn route_edges(
		&self,
		side_nodes: &BTreeMap<String, Vec<SideNode>>,
		pairs: &[NamespacePair],
	) -> (Vec<GraphNode>, Vec<GraphEdge>) {
		let mut nodes: Vec<GraphNode> = Vec::new();
		let mut edges = Vec::new();

		let mut materialize = |side_id: &str| {
			if nodes.iter().any(|node| node.id == side_id) {
				return;
			}
			let Some(anchor) = side_nodes
				.values()
				.flatten()
				.find(|candidate| candidate.id == side_id)
			else {
				return;
			};
			nodes.push(GraphNode {
				id: anchor.id.clone(),
				kind: NodeKind::Side,
				name: String::new(),
				parent: Some(anchor.namespace.clone()),
				active: false,
				side: Some(anchor.side),
				position: anchor.position,
			});
		};

		for pair in pairs {
			let Some(pairing) = self.pairing(&pair.a, &pair.b) else {
				continue;
			};
			materialize(&pairing.source_side_id);
			materialize(&pairing.target_side_id);
			edges.push(GraphEdge {
				id: format!("{}->{}", pairing.source_side_id, pairing.target_side_id),
				source: pairing.source_side_id.clone(),
				target: pairing.target_side_id.clone(),
				kind: EdgeKind::InterNamespace,
				count: pair.count,
			});
		}
		(nodes, edges)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rect(x: f64, y: f64) -> Rect {
		Rect { x, y, width: 100.0, height: 60.0 }
	}

	fn anchors_for(layout: &[(&str, Rect)]) -> BTreeMap<String, Vec<SideNode>> {
		layout
			.iter()
			.map(|(namespace, rect)| ((*namespace).to_owned(), side_anchors(namespace, *rect)))
			.collect()
	}

	fn pair(a: &str, b: &str) -> NamespacePair {
		NamespacePair { a: a.to_owned(), b: b.to_owned(), count: 1 }
	}

	#[test]
	fn picks_minimum_distance_complementary_pair() {
		// ns2 sits directly to the right of ns1
		let sides = anchors_for(&[("ns1", rect(0.0, 0.0)), ("ns2", rect(300.0, 0.0))]);
		let mut engine = PairingEngine::new();
		engine.recompute(&sides, &[pair("ns1", "ns2")]);

		let pairing = engine.pairing("ns1", "ns2").expect("pairing");
		assert_eq!(pairing.source_side, Side::Right);
		assert_eq!(pairing.target_side, Side::Left);
		assert_eq!(pairing.source_side_id, side_node_id("ns1", Side::Right));
		assert_eq!(pairing.target_side_id, side_node_id("ns2", Side::Left));

		// chosen distance is <= every other complementary combination
		for source in &sides["ns1"] {
			if let Some(target) = sides["ns2"]
				.iter()
				.find(|t| t.side == source.side.complement())
			{
				let dx = source.position.x - target.position.x;
				let dy = source.position.y - target.position.y;
				assert!(pairing.distance <= (dx * dx + dy * dy).sqrt());
			}
		}
	}

	#[test]
	fn pairing_sides_are_always_complementary() {
		let sides = anchors_for(&[
			("ns1", rect(0.0, 0.0)),
			("ns2", rect(40.0, 400.0)),
			("ns3", rect(500.0, 180.0)),
		]);
		let mut engine = PairingEngine::new();
		engine.recompute(
			&sides,
			&[pair("ns1", "ns2"), pair("ns1", "ns3"), pair("ns2", "ns3")],
		);
		for pairing in engine.pairings() {
			assert_eq!(pairing.source_side.complement(), pairing.target_side);
		}
	}

	#[test]
	fn tie_breaks_to_first_seen_candidate() {
		// two namespaces stacked vertically with only horizontal anchors:
		// left->right and right->left candidates are equally distant, so the
		// first candidate in enumeration order must win
		let mut sides = anchors_for(&[("ns1", rect(0.0, 200.0)), ("ns2", rect(0.0, 0.0))]);
		for anchors in sides.values_mut() {
			anchors.retain(|node| matches!(node.side, Side::Left | Side::Right));
		}
		let mut engine = PairingEngine::new();
		engine.recompute(&sides, &[pair("ns1", "ns2")]);
		let pairing = engine.pairing("ns1", "ns2").expect("pairing");
		assert_eq!(pairing.source_side, Side::Left);
		assert_eq!(pairing.target_side, Side::Right);
	}

	#[test]
	fn missing_complementary_side_drops_the_pair() {
		let mut sides = anchors_for(&[("ns1", rect(0.0, 0.0)), ("ns2", rect(300.0, 0.0))]);
		// ns2 offers only a Top anchor; ns1 has no Bottom-facing partner to
		// reach it from any enumerated side except Bottom->Top
		sides.get_mut("ns2").unwrap().retain(|node| node.side == Side::Top);
		sides.get_mut("ns1").unwrap().retain(|node| node.side == Side::Left);
		let mut engine = PairingEngine::new();
		engine.recompute(&sides, &[pair("ns1", "ns2")]);
		assert!(engine.pairing("ns1", "ns2").is_none());
		let (nodes, edges) = engine.route_edges(&sides, &[pair("ns1", "ns2")]);
		assert!(nodes.is_empty());
		assert!(edges.is_empty());
	}

	#[test]
	fn incremental_matches_full_recompute() {
		let pairs = [pair("ns1", "ns2"), pair("ns1", "ns3"), pair("ns2", "ns3")];
		let before = anchors_for(&[
			("ns1", rect(0.0, 0.0)),
			("ns2", rect(300.0, 0.0)),
			("ns3", rect(0.0, 300.0)),
		]);
		let after = anchors_for(&[
			("ns1", rect(500.0, 0.0)),
			("ns2", rect(300.0, 0.0)),
			("ns3", rect(0.0, 300.0)),
		]);

		let mut incremental = PairingEngine::new();
		incremental.recompute(&before, &pairs);
		incremental.recompute_for("ns1", &after, &pairs);

		let mut full = PairingEngine::new();
		full.recompute(&after, &pairs);

		for pair in &pairs {
			assert_eq!(
				incremental.pairing(&pair.a, &pair.b),
				full.pairing(&pair.a, &pair.b)
			);
		}
	}

	#[test]
	fn unrelated_pairings_survive_a_drag_untouched() {
		let pairs = [pair("ns1", "ns2"), pair("ns2", "ns3")];
		let before = anchors_for(&[
			("ns1", rect(0.0, 0.0)),
			("ns2", rect(300.0, 0.0)),
			("ns3", rect(0.0, 300.0)),
		]);
		let mut engine = PairingEngine::new();
		engine.recompute(&before, &pairs);
		let untouched = engine.pairing("ns2", "ns3").cloned().expect("pairing");

		// drag ns1 500px right; the ns2-ns3 pairing must be bit-identical
		let after = anchors_for(&[
			("ns1", rect(500.0, 0.0)),
			("ns2", rect(300.0, 0.0)),
			("ns3", rect(0.0, 300.0)),
		]);
		engine.recompute_for("ns1", &after, &pairs);
		assert_eq!(engine.pairing("ns2", "ns3"), Some(&untouched));
	}

	#[test]
	fn drag_evicts_only_the_moved_namespaces_distances() {
		let pairs = [pair("ns1", "ns2"), pair("ns2", "ns3")];
		let sides = anchors_for(&[
			("ns1", rect(0.0, 0.0)),
			("ns2", rect(300.0, 0.0)),
			("ns3", rect(0.0, 300.0)),
		]);
		let mut engine = PairingEngine::new();
		engine.recompute(&sides, &pairs);
		let populated = engine.cached_distances();
		engine.recompute_for("ns1", &sides, &pairs);
		// the ns2<->ns3 distances were reused, the ns1 ones re-derived
		assert_eq!(engine.cached_distances(), populated);
	}

	#[test]
	fn route_edges_emits_one_edge_and_lazy_side_nodes_per_pair() {
		let sides = anchors_for(&[("ns1", rect(0.0, 0.0)), ("ns2", rect(300.0, 0.0))]);
		let mut engine = PairingEngine::new();
		let pairs = [NamespacePair { a: "ns1".into(), b: "ns2".into(), count: 3 }];
		engine.recompute(&sides, &pairs);
		let (nodes, edges) = engine.route_edges(&sides, &pairs);

		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].kind, EdgeKind::InterNamespace);
		assert_eq!(edges[0].count, 3);
		// only the two winning anchors are materialized, not all eight
		assert_eq!(nodes.len(), 2);
		assert!(nodes.iter().all(|node| node.kind == NodeKind::Side));
	}
}
