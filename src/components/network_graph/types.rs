//! Input records and graph element types shared by the model builder,
//! pairing engine, layout, and renderer.

/// User-selected restriction on which entities/edges are visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
	#[default]
	All,
	Active,
	Allowed,
}

/// Kind of workload an [`Entity`] refers to. Only deployments are rendered;
/// other entity kinds pass through the feed but never become nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntityType {
	#[default]
	Deployment,
	External,
}

/// A workload reference supplied by the data-fetching layer.
#[derive(Clone, Debug)]
pub struct Entity {
	pub id: String,
	pub entity_type: EntityType,
	pub name: String,
	pub namespace: String,
	/// Whether runtime traffic has been observed for this workload.
	pub active: bool,
}

/// An observed or allowed traffic record between two entities.
#[derive(Clone, Debug)]
pub struct LogicalEdge {
	pub source: String,
	pub target: String,
	pub active: bool,
	pub allowed: bool,
}

/// Raw graph input for one rendering cycle.
#[derive(Clone, Debug, Default)]
pub struct ClusterData {
	pub entities: Vec<Entity>,
	pub edges: Vec<LogicalEdge>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn center(&self) -> Point {
		Point {
			x: self.x + self.width / 2.0,
			y: self.y + self.height / 2.0,
		}
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x
			&& p.x <= self.x + self.width
			&& p.y >= self.y
			&& p.y <= self.y + self.height
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let x = self.x.min(other.x);
		let y = self.y.min(other.y);
		let right = (self.x + self.width).max(other.x + other.width);
		let bottom = (self.y + self.height).max(other.y + other.height);
		Rect {
			x,
			y,
			width: right - x,
			height: bottom - y,
		}
	}
}

/// One of the four boundaries of a namespace container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
	Top,
	Bottom,
	Left,
	Right,
}

impl Side {
	pub const ALL: [Side; 4] = [Side::Top, Side::Left, Side::Right, Side::Bottom];

	/// The opposite-facing boundary, used to pick the routing direction
	/// between two namespace containers.
	pub fn complement(self) -> Side {
		match self {
			Side::Top => Side::Bottom,
			Side::Bottom => Side::Top,
			Side::Left => Side::Right,
			Side::Right => Side::Left,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Side::Top => "top",
			Side::Bottom => "bottom",
			Side::Left => "left",
			Side::Right => "right",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	Namespace,
	Deployment,
	Side,
}

/// A rendering element. Namespace nodes are parent containers, deployment
/// nodes live inside them, and side nodes are synthetic boundary proxies
/// materialized only for sides actually used by a routed edge.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub kind: NodeKind,
	pub name: String,
	pub parent: Option<String>,
	pub active: bool,
	pub side: Option<Side>,
	pub position: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	IntraNamespace,
	InterNamespace,
}

/// A rendering edge. Inter-namespace edges connect side nodes, never the
/// underlying deployments, and bundle all logical links between the pair.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	/// Number of logical links this edge represents.
	pub count: usize,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn side_complements_are_symmetric() {
		for side in Side::ALL {
			assert_eq!(side.complement().complement(), side);
		}
		assert_eq!(Side::Top.complement(), Side::Bottom);
		assert_eq!(Side::Left.complement(), Side::Right);
	}

	#[test]
	fn rect_union_covers_both() {
		let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
		let b = Rect { x: 20.0, y: -5.0, width: 10.0, height: 10.0 };
		let u = a.union(&b);
		assert_eq!(u.x, 0.0);
		assert_eq!(u.y, -5.0);
		assert_eq!(u.width, 30.0);
		assert_eq!(u.height, 15.0);
		assert!(u.contains(a.center()));
		assert!(u.contains(b.center()));
	}
}
