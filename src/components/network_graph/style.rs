//! Stylesheet description keyed by node/edge kind, consumed by the canvas
//! renderer on every structural change.

use super::types::{EdgeKind, NodeKind};

#[derive(Clone, Copy, Debug)]
pub struct NodeStyle {
	pub fill: &'static str,
	pub stroke: &'static str,
	pub radius: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeStyle {
	pub stroke: &'static str,
	pub width: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct GraphStylesheet {
	pub background: &'static str,
	pub namespace_fill: &'static str,
	pub namespace_stroke: &'static str,
	pub label_color: &'static str,
	pub dimmed_alpha: f64,
}

pub const STYLESHEET: GraphStylesheet = GraphStylesheet {
	background: "#1a1a2e",
	namespace_fill: "rgba(100, 180, 255, 0.06)",
	namespace_stroke: "rgba(100, 180, 255, 0.45)",
	label_color: "rgba(255, 255, 255, 0.85)",
	dimmed_alpha: 0.25,
};

pub fn node_style(kind: NodeKind, active: bool) -> NodeStyle {
	match kind {
		NodeKind::Deployment if active => NodeStyle {
			fill: "#2ca02c",
			stroke: "rgba(255, 255, 255, 0.6)",
			radius: 6.0,
		},
		NodeKind::Deployment => NodeStyle {
			fill: "#1f77b4",
			stroke: "rgba(255, 255, 255, 0.4)",
			radius: 6.0,
		},
		NodeKind::Side => NodeStyle {
			fill: "rgba(100, 180, 255, 0.9)",
			stroke: "rgba(255, 255, 255, 0.9)",
			radius: 3.0,
		},
		// namespaces with observed runtime traffic get the stronger outline
		NodeKind::Namespace if active => NodeStyle {
			fill: STYLESHEET.namespace_fill,
			stroke: "rgba(100, 220, 160, 0.6)",
			radius: 0.0,
		},
		NodeKind::Namespace => NodeStyle {
			fill: STYLESHEET.namespace_fill,
			stroke: STYLESHEET.namespace_stroke,
			radius: 0.0,
		},
	}
}

pub fn edge_style(kind: EdgeKind) -> EdgeStyle {
	match kind {
		EdgeKind::IntraNamespace => EdgeStyle {
			stroke: "rgba(100, 180, 255, 0.6)",
			width: 1.5,
		},
		EdgeKind::InterNamespace => EdgeStyle {
			stroke: "rgba(255, 180, 100, 0.8)",
			width: 2.5,
		},
	}
}
