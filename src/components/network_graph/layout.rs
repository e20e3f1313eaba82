//! Two-phase deterministic placement: namespace containers on a coarse
//! page-level grid, then a grid sub-layout of each namespace's deployments.
//! Runs on structural changes only, never per drag frame.

use std::collections::{BTreeMap, HashMap};

use super::model::GraphModel;
use super::types::{Point, Rect};

/// Fixed padding between namespace containers on the page grid.
pub const NAMESPACE_PADDING: f64 = 100.0;
/// Cell pitch of the per-namespace deployment grid.
pub const NODE_SPACING: f64 = 70.0;
/// Reserved label strip at the top of each container. Sides get no padding
/// so side anchors sit flush with the boundary.
pub const TOP_PADDING: f64 = 40.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphLayout {
	pub rects: BTreeMap<String, Rect>,
	pub positions: HashMap<String, Point>,
}

fn grid_columns(count: usize) -> usize {
	(count as f64).sqrt().ceil().max(1.0) as usize
}

fn container_size(member_count: usize) -> (f64, f64) {
	let columns = grid_columns(member_count);
	let rows = member_count.div_ceil(columns).max(1);
	(
		columns as f64 * NODE_SPACING,
		rows as f64 * NODE_SPACING + TOP_PADDING,
	)
}

/// Places every namespace container and every deployment within it.
/// Deterministic: the model's namespace order fixes grid order, and members
/// fill their sub-grid row-major in model order.
pub fn layout_model(model: &GraphModel) -> GraphLayout {
	let members: BTreeMap<&str, Vec<&str>> = model
		.namespaces
		.iter()
		.map(|namespace| {
			let ids = model
				.deployments
				.iter()
				.filter(|node| node.parent.as_deref() == Some(namespace.id.as_str()))
				.map(|node| node.id.as_str())
				.collect();
			(namespace.id.as_str(), ids)
		})
		.collect();

	// cell pitch of the page grid is driven by the largest container
	let (mut cell_width, mut cell_height) = (0.0_f64, 0.0_f64);
	for ids in members.values() {
		let (width, height) = container_size(ids.len());
		cell_width = cell_width.max(width);
		cell_height = cell_height.max(height);
	}
	cell_width += NAMESPACE_PADDING;
	cell_height += NAMESPACE_PADDING;

	let page_columns = grid_columns(members.len());
	let mut rects = BTreeMap::new();
	let mut positions = HashMap::new();

	for (index, (namespace, ids)) in members.iter().enumerate() {
		let page_col = index % page_columns;
		let page_row = index / page_columns;
		let (width, height) = container_size(ids.len());
		let rect = Rect {
			x: page_col as f64 * cell_width,
			y: page_row as f64 * cell_height,
			width,
			height,
		};

		let columns = grid_columns(ids.len());
		for (slot, id) in ids.iter().enumerate() {
			let col = slot % columns;
			let row = slot / columns;
			positions.insert(
				(*id).to_owned(),
				Point {
					x: rect.x + (col as f64 + 0.5) * NODE_SPACING,
					y: rect.y + TOP_PADDING + (row as f64 + 0.5) * NODE_SPACING,
				},
			);
		}
		rects.insert((*namespace).to_owned(), rect);
	}

	GraphLayout { rects, positions }
}

/// Recomputes a container's bounding box from its members' current
/// positions, used when a member drag stretches the box.
pub fn namespace_bounds(member_positions: &[Point]) -> Option<Rect> {
	let first = member_positions.first()?;
	let mut min = *first;
	let mut max = *first;
	for point in member_positions {
		min.x = min.x.min(point.x);
		min.y = min.y.min(point.y);
		max.x = max.x.max(point.x);
		max.y = max.y.max(point.y);
	}
	let half = NODE_SPACING / 2.0;
	Some(Rect {
		x: min.x - half,
		y: min.y - half - TOP_PADDING,
		width: max.x - min.x + NODE_SPACING,
		height: max.y - min.y + NODE_SPACING + TOP_PADDING,
	})
}

/// Bounding box of the whole placed scene, for zoom-to-fit.
pub fn scene_bounds(rects: &BTreeMap<String, Rect>) -> Option<Rect> {
	let mut iter = rects.values();
	let first = *iter.next()?;
	Some(iter.fold(first, |acc, rect| acc.union(rect)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::model::build_model;
	use crate::components::network_graph::types::{ClusterData, Entity, EntityType, FilterMode};

	fn data(namespace_sizes: &[(&str, usize)]) -> ClusterData {
		let entities = namespace_sizes
			.iter()
			.flat_map(|(namespace, count)| {
				(0..*count).map(move |i| Entity {
					id: format!("{namespace}-d{i}"),
					entity_type: EntityType::Deployment,
					name: format!("{namespace}-d{i}"),
					namespace: (*namespace).to_owned(),
					active: false,
				})
			})
			.collect();
		ClusterData { entities, edges: Vec::new() }
	}

	#[test]
	fn layout_is_deterministic() {
		let model = build_model(&data(&[("ns1", 4), ("ns2", 2), ("ns3", 7)]), FilterMode::All);
		assert_eq!(layout_model(&model), layout_model(&model));
	}

	#[test]
	fn containers_do_not_overlap() {
		let model = build_model(&data(&[("ns1", 5), ("ns2", 5), ("ns3", 1), ("ns4", 9)]), FilterMode::All);
		let layout = layout_model(&model);
		let rects: Vec<&Rect> = layout.rects.values().collect();
		for (i, a) in rects.iter().enumerate() {
			for b in rects.iter().skip(i + 1) {
				let separated = a.x + a.width <= b.x
					|| b.x + b.width <= a.x
					|| a.y + a.height <= b.y
					|| b.y + b.height <= a.y;
				assert!(separated, "{a:?} overlaps {b:?}");
			}
		}
	}

	#[test]
	fn members_sit_inside_their_container_below_the_label_strip() {
		let model = build_model(&data(&[("ns1", 6)]), FilterMode::All);
		let layout = layout_model(&model);
		let rect = layout.rects["ns1"];
		for position in layout.positions.values() {
			assert!(rect.contains(*position));
			assert!(position.y >= rect.y + TOP_PADDING);
		}
	}

	#[test]
	fn namespace_bounds_wrap_member_positions() {
		let points = vec![
			Point { x: 100.0, y: 100.0 },
			Point { x: 240.0, y: 180.0 },
		];
		let rect = namespace_bounds(&points).expect("bounds");
		for point in &points {
			assert!(rect.contains(*point));
		}
		assert!(namespace_bounds(&[]).is_none());
	}

	#[test]
	fn scene_bounds_cover_every_container() {
		let model = build_model(&data(&[("ns1", 3), ("ns2", 8)]), FilterMode::All);
		let layout = layout_model(&model);
		let bounds = scene_bounds(&layout.rects).expect("bounds");
		for rect in layout.rects.values() {
			assert_eq!(bounds.union(rect), bounds);
		}
	}
}
