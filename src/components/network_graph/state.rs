//! Owns all derived graph state for one graph session and dispatches
//! pointer events to model mutations. Pure with respect to the rendering
//! engine: the canvas adapter executes the returned actions.

use std::collections::BTreeMap;

use log::debug;

use super::layout::{self, GraphLayout};
use super::model::{GraphModel, build_model};
use super::pairing::{PairingEngine, SideNode, side_anchors};
use super::types::{
	ClusterData, FilterMode, GraphEdge, GraphNode, NodeKind, Point, Rect,
};
use super::viewport::Viewport;

pub const HIT_RADIUS: f64 = 12.0;
pub const EDGE_HIT_RADIUS: f64 = 6.0;
/// Minimum interval between side-pairing recomputations during a drag.
pub const DRAG_THROTTLE_MS: f64 = 100.0;

/// Drops intermediate events in a burst but remembers that one was dropped,
/// so the caller can always process the final event.
#[derive(Clone, Debug)]
pub struct Throttle {
	interval: f64,
	last: f64,
	pending: bool,
}

impl Throttle {
	pub fn new(interval: f64) -> Self {
		Self { interval, last: f64::NEG_INFINITY, pending: false }
	}

	/// True when enough time has passed to run now; otherwise the event is
	/// recorded as pending.
	pub fn ready(&mut self, now: f64) -> bool {
		if now - self.last >= self.interval {
			self.last = now;
			self.pending = false;
			true
		} else {
			self.pending = true;
			false
		}
	}

	/// Takes the pending marker, if an event was dropped since the last run.
	pub fn flush(&mut self) -> bool {
		std::mem::take(&mut self.pending)
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

/// What the pointer landed on, in priority order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitTarget {
	Deployment(String),
	SideNode(String),
	Edge(String),
	Namespace(String),
	Background,
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq == 0.0 {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
	(cx * cx + cy * cy).sqrt()
}

/// Click outcome for the adapter to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
	/// Clear selection, notify the deselected callback, navigate to the
	/// base graph URL.
	Deselect,
	SelectNamespace { id: String, deployments: Vec<String> },
	/// Select the node and navigate to its URL.
	SelectDeployment { id: String },
	Ignore,
}

/// Hover outcome for the adapter to execute.
#[derive(Clone, Debug, PartialEq)]
pub enum HoverAction {
	ShowTooltip { id: String, name: String, anchor: Point },
	HideTooltip,
}

pub struct NetworkGraphState {
	data: ClusterData,
	filter: FilterMode,
	model: GraphModel,
	layout: GraphLayout,
	side_nodes: BTreeMap<String, Vec<SideNode>>,
	engine: PairingEngine,
	side_elements: Vec<GraphNode>,
	inter_edges: Vec<GraphEdge>,
	pub viewport: Viewport,
	pub selected: Option<String>,
	pub hovered: Option<String>,
	pub drag: DragState,
	drag_throttle: Throttle,
	pending_recompute: Option<String>,
}

impl NetworkGraphState {
	pub fn new(data: ClusterData, filter: FilterMode, width: f64, height: f64) -> Self {
		let mut state = Self {
			data,
			filter,
			model: GraphModel::default(),
			layout: GraphLayout::default(),
			side_nodes: BTreeMap::new(),
			engine: PairingEngine::new(),
			side_elements: Vec::new(),
			inter_edges: Vec::new(),
			viewport: Viewport::new(width, height),
			selected: None,
			hovered: None,
			drag: DragState::default(),
			drag_throttle: Throttle::new(DRAG_THROTTLE_MS),
			pending_recompute: None,
		};
		state.rebuild();
		state
	}

	pub fn set_data(&mut self, data: ClusterData) {
		self.data = data;
		self.rebuild();
	}

	pub fn set_filter(&mut self, filter: FilterMode) {
		if self.filter != filter {
			self.filter = filter;
			self.rebuild();
		}
	}

	/// Full recomputation: model, layout, side anchors, pairings, routed
	/// edges, then a single zoom-to-fit. Runs once per structural input
	/// change, not per drag frame.
	fn rebuild(&mut self) {
		self.model = build_model(&self.data, self.filter);
		self.layout = layout::layout_model(&self.model);
		for node in &mut self.model.deployments {
			if let Some(position) = self.layout.positions.get(&node.id) {
				node.position = *position;
			}
		}
		self.refresh_side_nodes();
		self.engine.recompute(&self.side_nodes, &self.model.namespace_pairs);
		self.reroute();
		if let Some(bounds) = layout::scene_bounds(&self.layout.rects) {
			self.viewport.zoom_to_fit(bounds);
		}
		debug!(
			"graph rebuilt: {} namespaces, {} deployments, {} routed pairs",
			self.model.namespaces.len(),
			self.model.deployments.len(),
			self.inter_edges.len()
		);
	}

	fn refresh_side_nodes(&mut self) {
		self.side_nodes = self
			.layout
			.rects
			.iter()
			.map(|(namespace, rect)| (namespace.clone(), side_anchors(namespace, *rect)))
			.collect();
	}

	fn reroute(&mut self) {
		let (nodes, edges) =
			self.engine.route_edges(&self.side_nodes, &self.model.namespace_pairs);
		self.side_elements = nodes;
		self.inter_edges = edges;
	}

	pub fn namespaces(&self) -> &[GraphNode] {
		&self.model.namespaces
	}

	pub fn deployments(&self) -> &[GraphNode] {
		&self.model.deployments
	}

	pub fn side_elements(&self) -> &[GraphNode] {
		&self.side_elements
	}

	pub fn intra_edges(&self) -> &[GraphEdge] {
		&self.model.intra_edges
	}

	pub fn inter_edges(&self) -> &[GraphEdge] {
		&self.inter_edges
	}

	pub fn namespace_rect(&self, namespace: &str) -> Option<&Rect> {
		self.layout.rects.get(namespace)
	}

	pub fn node_position(&self, id: &str) -> Option<Point> {
		self.model
			.deployments
			.iter()
			.chain(self.side_elements.iter())
			.find(|node| node.id == id)
			.map(|node| node.position)
	}

	pub fn node_screen_position(&self, id: &str) -> Option<Point> {
		self.node_position(id).map(|p| self.viewport.graph_to_screen(p))
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	/// Fits the current scene; a no-op while the graph is empty.
	pub fn zoom_to_fit(&mut self) {
		if let Some(bounds) = layout::scene_bounds(&self.layout.rects) {
			self.viewport.zoom_to_fit(bounds);
		}
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> HitTarget {
		let point = self.viewport.screen_to_graph(sx, sy);
		let within = |node: &GraphNode| {
			let dx = node.position.x - point.x;
			let dy = node.position.y - point.y;
			(dx * dx + dy * dy).sqrt() < HIT_RADIUS
		};
		if let Some(node) = self.model.deployments.iter().find(|node| within(node)) {
			return HitTarget::Deployment(node.id.clone());
		}
		if let Some(node) = self.side_elements.iter().find(|node| within(node)) {
			return HitTarget::SideNode(node.id.clone());
		}
		let on_edge = |edge: &GraphEdge| {
			match (self.node_position(&edge.source), self.node_position(&edge.target)) {
				(Some(a), Some(b)) => distance_to_segment(point, a, b) < EDGE_HIT_RADIUS,
				_ => false,
			}
		};
		if let Some(edge) = self
			.model
			.intra_edges
			.iter()
			.chain(self.inter_edges.iter())
			.find(|edge| on_edge(edge))
		{
			return HitTarget::Edge(edge.id.clone());
		}
		if let Some((namespace, _)) = self
			.layout
			.rects
			.iter()
			.find(|(_, rect)| rect.contains(point))
		{
			return HitTarget::Namespace(namespace.clone());
		}
		HitTarget::Background
	}

	/// First matching rule wins: background or re-clicking the current
	/// selection deselects; edges and side nodes are not selectable;
	/// namespaces report their member deployments; deployments select and
	/// navigate.
	pub fn handle_click(&mut self, target: HitTarget) -> ClickAction {
		let target_id = match &target {
			HitTarget::Deployment(id) | HitTarget::Namespace(id) => Some(id.clone()),
			_ => None,
		};
		if target == HitTarget::Background
			|| (target_id.is_some() && target_id == self.selected)
		{
			self.selected = None;
			return ClickAction::Deselect;
		}
		match target {
			HitTarget::SideNode(_) | HitTarget::Edge(_) => ClickAction::Ignore,
			HitTarget::Namespace(id) => {
				self.selected = Some(id.clone());
				let deployments = self.model.deployment_ids_in(&id);
				ClickAction::SelectNamespace { id, deployments }
			}
			HitTarget::Deployment(id) => {
				self.selected = Some(id.clone());
				ClickAction::SelectDeployment { id }
			}
			HitTarget::Background => unreachable!("handled above"),
		}
	}

	pub fn select_deployment(&mut self, id: &str) -> bool {
		let exists = self.model.deployments.iter().any(|node| node.id == id);
		if exists {
			self.selected = Some(id.to_owned());
		}
		exists
	}

	/// Only deployment nodes with a parent raise the tooltip; everything
	/// else hides it.
	pub fn handle_hover(&mut self, target: HitTarget) -> HoverAction {
		if let HitTarget::Deployment(id) = target {
			let node = self
				.model
				.deployments
				.iter()
				.find(|node| node.id == id && node.parent.is_some());
			if let Some(node) = node {
				self.hovered = Some(node.id.clone());
				let anchor = self.viewport.graph_to_screen(node.position);
				return HoverAction::ShowTooltip {
					id: node.id.clone(),
					name: node.name.clone(),
					anchor,
				};
			}
		}
		self.hovered = None;
		HoverAction::HideTooltip
	}

	/// Whether a deployment is rendered in the dimmed background state.
	/// Hovering a node lifts the dimming from it and its namespace siblings.
	pub fn is_dimmed(&self, node: &GraphNode) -> bool {
		let Some(hovered_id) = &self.hovered else {
			return false;
		};
		let hovered_parent = self
			.model
			.deployments
			.iter()
			.find(|candidate| &candidate.id == hovered_id)
			.and_then(|candidate| candidate.parent.clone());
		match node.kind {
			NodeKind::Deployment => node.parent != hovered_parent,
			NodeKind::Namespace => Some(&node.id) != hovered_parent.as_ref(),
			NodeKind::Side => false,
		}
	}

	/// Starts a drag if the pointer is on a deployment. Namespace
	/// containers are locked after initial layout and never user-draggable.
	pub fn begin_drag(&mut self, sx: f64, sy: f64) -> bool {
		let HitTarget::Deployment(id) = self.hit_test(sx, sy) else {
			return false;
		};
		let Some(position) = self.node_position(&id) else {
			return false;
		};
		self.drag = DragState {
			active: true,
			node_id: Some(id),
			moved: false,
			start_x: sx,
			start_y: sy,
			node_start: position,
		};
		true
	}

	/// Moves the dragged node with the pointer. The expensive pairing
	/// recomputation is throttled; dropped events leave a pending marker
	/// that `end_drag` flushes.
	pub fn drag_to(&mut self, sx: f64, sy: f64, now: f64) {
		if !self.drag.active {
			return;
		}
		let Some(id) = self.drag.node_id.clone() else {
			return;
		};
		let k = self.viewport.transform.k;
		let position = Point {
			x: self.drag.node_start.x + (sx - self.drag.start_x) / k,
			y: self.drag.node_start.y + (sy - self.drag.start_y) / k,
		};
		self.drag.moved = true;

		let mut namespace = None;
		for node in &mut self.model.deployments {
			if node.id == id {
				node.position = position;
				self.layout.positions.insert(id.clone(), position);
				namespace = node.parent.clone();
				break;
			}
		}
		let Some(namespace) = namespace else {
			return;
		};
		if self.drag_throttle.ready(now) {
			self.recompute_moved(&namespace);
		} else {
			self.pending_recompute = Some(namespace);
		}
	}

	pub fn end_drag(&mut self) {
		if self.drag.active && self.drag_throttle.flush() {
			if let Some(namespace) = self.pending_recompute.take() {
				self.recompute_moved(&namespace);
			}
		}
		self.drag.active = false;
		self.drag.node_id = None;
	}

	/// Incremental path for one moved namespace: refresh its bounding box
	/// and side anchors, recompute only the pairings touching it, and
	/// rebuild inter-namespace edges. Intra-namespace edges and unaffected
	/// pairings stay untouched.
	fn recompute_moved(&mut self, namespace: &str) {
		let member_positions: Vec<Point> = self
			.model
			.deployments
			.iter()
			.filter(|node| node.parent.as_deref() == Some(namespace))
			.map(|node| node.position)
			.collect();
		let Some(rect) = layout::namespace_bounds(&member_positions) else {
			return;
		};
		self.layout.rects.insert(namespace.to_owned(), rect);
		self.side_nodes
			.insert(namespace.to_owned(), side_anchors(namespace, rect));
		self.engine
			.recompute_for(namespace, &self.side_nodes, &self.model.namespace_pairs);
		self.reroute();
	}

	#[cfg(test)]
	pub fn engine(&self) -> &PairingEngine {
		&self.engine
	}
}
