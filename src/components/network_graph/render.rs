use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::NetworkGraphState;
use super::style::{STYLESHEET, edge_style, node_style};
use super::types::{EdgeKind, GraphEdge, NodeKind, Point};

pub fn render(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(STYLESHEET.background);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	ctx.save();
	let transform = state.viewport.transform;
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_namespaces(state, ctx);
	draw_edges(state, ctx);
	draw_side_nodes(state, ctx);
	draw_deployments(state, ctx);
	ctx.restore();
}

fn draw_namespaces(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.transform.k;
	let label_font = state.viewport.label_font();

	for namespace in state.namespaces() {
		let Some(rect) = state.namespace_rect(&namespace.id) else {
			continue;
		};
		let style = node_style(NodeKind::Namespace, namespace.active);
		let alpha = if state.is_dimmed(namespace) {
			STYLESHEET.dimmed_alpha
		} else {
			1.0
		};
		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(style.fill);
		ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
		ctx.set_stroke_style_str(style.stroke);
		ctx.set_line_width(1.5 / k);
		ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);

		// namespace labels use the zoom-bucketed font size
		ctx.set_fill_style_str(STYLESHEET.label_color);
		ctx.set_font(&format!("{label_font}px sans-serif"));
		let _ = ctx.fill_text(&namespace.name, rect.x + 6.0, rect.y + label_font + 4.0);
		ctx.set_global_alpha(1.0);
	}
}

fn edge_endpoints(state: &NetworkGraphState, edge: &GraphEdge) -> Option<(Point, Point)> {
	Some((
		state.node_position(&edge.source)?,
		state.node_position(&edge.target)?,
	))
}

fn draw_edges(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.transform.k;
	let label_font = state.viewport.label_font();

	for edge in state.intra_edges().iter().chain(state.inter_edges()) {
		let Some((from, to)) = edge_endpoints(state, edge) else {
			continue;
		};
		let style = edge_style(edge.kind);
		ctx.set_stroke_style_str(style.stroke);
		ctx.set_line_width(style.width / k);
		if edge.kind == EdgeKind::InterNamespace {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(8.0 / k),
				&JsValue::from_f64(4.0 / k),
			));
		}
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		// inter-namespace edges carry the bundled link count, scaled like
		// namespace labels
		if edge.kind == EdgeKind::InterNamespace && edge.count > 0 {
			let mid = Point { x: (from.x + to.x) / 2.0, y: (from.y + to.y) / 2.0 };
			ctx.set_fill_style_str(STYLESHEET.label_color);
			ctx.set_font(&format!("{label_font}px sans-serif"));
			let _ = ctx.fill_text(&edge.count.to_string(), mid.x + 4.0, mid.y - 4.0);
		}
	}
}

fn draw_side_nodes(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let style = node_style(NodeKind::Side, false);
	for node in state.side_elements() {
		ctx.begin_path();
		let _ = ctx.arc(node.position.x, node.position.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();
	}
}

fn draw_deployments(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.transform.k;

	for node in state.deployments() {
		let style = node_style(NodeKind::Deployment, node.active);
		let alpha = if state.is_dimmed(node) {
			STYLESHEET.dimmed_alpha
		} else {
			1.0
		};
		let is_selected = state.selected.as_deref() == Some(node.id.as_str());

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.position.x, node.position.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();
		if is_selected {
			ctx.begin_path();
			let _ = ctx.arc(
				node.position.x,
				node.position.y,
				style.radius + 2.0 / k,
				0.0,
				2.0 * PI,
			);
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		// deployment labels keep a fixed on-screen size, outside the
		// zoom-bucket cache
		ctx.set_fill_style_str(STYLESHEET.label_color);
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(
			&node.name,
			node.position.x + style.radius + 3.0,
			node.position.y + 3.0,
		);
		ctx.set_global_alpha(1.0);
	}
}
