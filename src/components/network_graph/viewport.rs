//! Zoom/pan state: zoom-to-fit, stepped zoom about the viewport center, and
//! the discretized zoom-bucket label font cache.

use std::collections::HashMap;

use super::types::{Point, Rect};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.2;
/// Margin kept around the scene by zoom-to-fit.
pub const GRAPH_PADDING: f64 = 80.0;
/// Base size of namespace and inter-namespace edge labels.
pub const NS_FONT_SIZE: f64 = 12.0;
const ZOOM_BUCKET_GRANULARITY: f64 = 20.0;

#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug)]
pub struct Viewport {
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
	min_zoom: f64,
	max_zoom: f64,
	label_font: f64,
	font_sizes: HashMap<u32, f64>,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			width,
			height,
			min_zoom: MIN_ZOOM,
			max_zoom: MAX_ZOOM,
			label_font: NS_FONT_SIZE,
			font_sizes: HashMap::new(),
		}
	}

	pub fn min_zoom(&self) -> f64 {
		self.min_zoom
	}

	pub fn zoom(&self) -> f64 {
		self.transform.k
	}

	/// Current size for namespace labels and inter-namespace edge labels.
	/// Deployment labels are not scaled through this cache.
	pub fn label_font(&self) -> f64 {
		self.label_font
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point {
			x: (sx - self.transform.x) / self.transform.k,
			y: (sy - self.transform.y) / self.transform.k,
		}
	}

	pub fn graph_to_screen(&self, point: Point) -> Point {
		Point {
			x: point.x * self.transform.k + self.transform.x,
			y: point.y * self.transform.k + self.transform.y,
		}
	}

	/// Scales and translates so the whole scene is visible inside the
	/// padding margin. Lowers the minimum zoom to the fit level when the fit
	/// level is smaller, so the user cannot zoom out past "everything
	/// visible". Idempotent for an unchanged scene.
	pub fn zoom_to_fit(&mut self, bounds: Rect) {
		if bounds.width <= 0.0 || bounds.height <= 0.0 {
			return;
		}
		let fit = ((self.width - 2.0 * GRAPH_PADDING) / bounds.width)
			.min((self.height - 2.0 * GRAPH_PADDING) / bounds.height)
			.min(self.max_zoom);
		self.min_zoom = self.min_zoom.min(fit);

		let center = bounds.center();
		self.transform.k = fit;
		self.transform.x = self.width / 2.0 - center.x * fit;
		self.transform.y = self.height / 2.0 - center.y * fit;
		self.refresh_label_font();
	}

	pub fn zoom_in(&mut self) {
		self.zoom_about_center(self.transform.k + ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_about_center(self.transform.k - ZOOM_STEP);
	}

	fn zoom_about_center(&mut self, level: f64) {
		self.zoom_about(level, self.width / 2.0, self.height / 2.0);
	}

	/// Rescales about a fixed screen point, clamped to the zoom range.
	pub fn zoom_about(&mut self, level: f64, sx: f64, sy: f64) {
		let new_k = level.clamp(self.min_zoom, self.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.refresh_label_font();
	}

	// Buckets the zoom level so repeated zooming within one bucket reuses
	// the cached size.
	fn refresh_label_font(&mut self) {
		let bucket = (self.transform.k * ZOOM_BUCKET_GRANULARITY).round().max(1.0) as u32;
		let size = *self.font_sizes.entry(bucket).or_insert_with(|| {
			(NS_FONT_SIZE / bucket as f64 * ZOOM_BUCKET_GRANULARITY).max(NS_FONT_SIZE)
		});
		self.label_font = size;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scene() -> Rect {
		Rect { x: 0.0, y: 0.0, width: 2000.0, height: 1200.0 }
	}

	#[test]
	fn zoom_to_fit_is_idempotent() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_to_fit(scene());
		let (first_k, first_x, first_y) =
			(viewport.transform.k, viewport.transform.x, viewport.transform.y);
		viewport.zoom_to_fit(scene());
		assert_eq!(viewport.transform.k, first_k);
		assert_eq!(viewport.transform.x, first_x);
		assert_eq!(viewport.transform.y, first_y);
	}

	#[test]
	fn zoom_to_fit_lowers_min_zoom_below_the_floor() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_to_fit(Rect { x: 0.0, y: 0.0, width: 50_000.0, height: 50_000.0 });
		assert!(viewport.min_zoom() < MIN_ZOOM);
		assert_eq!(viewport.zoom(), viewport.min_zoom());
	}

	#[test]
	fn zoom_to_fit_keeps_the_scene_inside_the_padding() {
		let mut viewport = Viewport::new(800.0, 600.0);
		let bounds = scene();
		viewport.zoom_to_fit(bounds);
		let top_left = viewport.graph_to_screen(Point { x: bounds.x, y: bounds.y });
		let bottom_right = viewport.graph_to_screen(Point {
			x: bounds.x + bounds.width,
			y: bounds.y + bounds.height,
		});
		assert!(top_left.x >= GRAPH_PADDING - 1e-9);
		assert!(top_left.y >= 0.0);
		assert!(bottom_right.x <= viewport.width - GRAPH_PADDING + 1e-9);
		assert!(bottom_right.y <= viewport.height);
	}

	#[test]
	fn stepped_zoom_clamps_to_the_range() {
		let mut viewport = Viewport::new(800.0, 600.0);
		for _ in 0..50 {
			viewport.zoom_in();
		}
		assert_eq!(viewport.zoom(), MAX_ZOOM);
		for _ in 0..50 {
			viewport.zoom_out();
		}
		assert_eq!(viewport.zoom(), MIN_ZOOM);
	}

	#[test]
	fn stepped_zoom_keeps_the_center_fixed() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_to_fit(scene());
		let center = viewport.screen_to_graph(400.0, 300.0);
		viewport.zoom_in();
		let after = viewport.screen_to_graph(400.0, 300.0);
		assert!((center.x - after.x).abs() < 1e-9);
		assert!((center.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn label_font_never_drops_below_base_size() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_about(3.0, 400.0, 300.0);
		assert_eq!(viewport.label_font(), NS_FONT_SIZE);
		viewport.zoom_about(0.25, 400.0, 300.0);
		assert!(viewport.label_font() > NS_FONT_SIZE);
	}

	#[test]
	fn same_zoom_bucket_reuses_the_cached_size() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_about(0.5, 400.0, 300.0);
		let first = viewport.label_font();
		// 0.501 rounds into the same bucket of 10
		viewport.zoom_about(0.501, 400.0, 300.0);
		assert_eq!(viewport.label_font(), first);
	}
}
