use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{ClickAction, HoverAction, NetworkGraphState};
use super::types::{ClusterData, FilterMode};

#[derive(Clone, Debug, PartialEq)]
struct TooltipData {
	x: f64,
	y: f64,
	name: String,
}

#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|window| window.performance())
		.map(|performance| performance.now())
		.unwrap_or(0.0)
}

fn event_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas adapter around [`NetworkGraphState`]: forwards pointer events,
/// runs the render loop, anchors the tooltip overlay, and executes
/// navigation and selection callbacks.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] data: Signal<ClusterData>,
	#[prop(into)] filter: Signal<FilterMode>,
	/// Suppresses the initial auto-selection of the route's deployment.
	#[prop(default = false)]
	simulation: bool,
	/// Deployment id carried by the current route, if any.
	#[prop(optional_no_strip)]
	selected_id: Option<String>,
	#[prop(optional)] on_node_selected: Option<Callback<String>>,
	#[prop(optional)] on_namespace_selected: Option<Callback<(String, Vec<String>)>>,
	#[prop(optional)] on_deselected: Option<Callback<()>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<NetworkGraphState>>> = Rc::new(RefCell::new(None));
	let pan: Rc<RefCell<PanState>> = Rc::new(RefCell::new(PanState::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let suppress_click = Rc::new(RefCell::new(false));
	let tooltip = RwSignal::new(None::<TooltipData>);
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let cluster = data.get();
		let filter_mode = filter.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let mut slot = state_init.borrow_mut();
		if let Some(ref mut existing) = *slot {
			existing.set_data(cluster);
			existing.set_filter(filter_mode);
			return;
		}

		let window: Window = web_sys::window().unwrap();
		let (w, h) = (
			window.inner_width().unwrap().as_f64().unwrap(),
			window.inner_height().unwrap().as_f64().unwrap(),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let mut graph = NetworkGraphState::new(cluster, filter_mode, w, h);
		if !simulation {
			if let Some(id) = selected_id.as_deref() {
				if graph.select_deployment(id) {
					if let Some(callback) = on_node_selected {
						callback.run(id.to_owned());
					}
				}
			}
		}
		*slot = Some(graph);
		drop(slot);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let win: Window = web_sys::window().unwrap();
			let (nw, nh) = (
				win.inner_width().unwrap().as_f64().unwrap(),
				win.inner_height().unwrap().as_f64().unwrap(),
			);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
				s.zoom_to_fit();
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ =
				window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (state_md, pan_md) = (state.clone(), pan.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		// any mouse-down destroys the tooltip immediately
		tooltip.set(None);

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if !s.begin_drag(x, y) {
				let mut p = pan_md.borrow_mut();
				p.active = true;
				p.start_x = x;
				p.start_y = y;
				p.transform_start_x = s.viewport.transform.x;
				p.transform_start_y = s.viewport.transform.y;
			}
		}
	};

	let (state_mm, pan_mm) = (state.clone(), pan.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y, now_ms());
				return;
			}
			let mut p = pan_mm.borrow_mut();
			if p.active {
				s.viewport.transform.x = p.transform_start_x + (x - p.start_x);
				s.viewport.transform.y = p.transform_start_y + (y - p.start_y);
				return;
			}
			drop(p);

			let target = s.hit_test(x, y);
			match s.handle_hover(target) {
				HoverAction::ShowTooltip { name, anchor, .. } => {
					tooltip.set(Some(TooltipData { x: anchor.x, y: anchor.y, name }));
				}
				HoverAction::HideTooltip => tooltip.set(None),
			}
		}
	};

	let (state_mu, pan_mu, suppress_mu) = (state.clone(), pan.clone(), suppress_click.clone());
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active && s.drag.moved {
				*suppress_mu.borrow_mut() = true;
			}
			s.end_drag();
		}
		pan_mu.borrow_mut().active = false;
	};

	let navigate = use_navigate();
	let (state_cl, suppress_cl) = (state.clone(), suppress_click.clone());
	let on_click = move |ev: MouseEvent| {
		if std::mem::take(&mut *suppress_cl.borrow_mut()) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut s) = *state_cl.borrow_mut() {
			let target = s.hit_test(x, y);
			match s.handle_click(target) {
				ClickAction::Deselect => {
					if let Some(callback) = on_deselected {
						callback.run(());
					}
					navigate("/network", Default::default());
				}
				ClickAction::SelectNamespace { id, deployments } => {
					if let Some(callback) = on_namespace_selected {
						callback.run((id, deployments));
					}
				}
				ClickAction::SelectDeployment { id } => {
					if let Some(callback) = on_node_selected {
						callback.run(id.clone());
					}
					navigate(&format!("/network/{id}"), Default::default());
				}
				ClickAction::Ignore => {}
			}
		}
	};

	let (state_ml, pan_ml) = (state.clone(), pan.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
			s.hovered = None;
		}
		pan_ml.borrow_mut().active = false;
		tooltip.set(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let level = s.viewport.zoom() * factor;
			s.viewport.zoom_about(level, x, y);
		}
	};

	let state_zi = state.clone();
	let zoom_in = move |_| {
		if let Some(ref mut s) = *state_zi.borrow_mut() {
			s.viewport.zoom_in();
		}
	};
	let state_zo = state.clone();
	let zoom_out = move |_| {
		if let Some(ref mut s) = *state_zo.borrow_mut() {
			s.viewport.zoom_out();
		}
	};
	let state_zf = state.clone();
	let zoom_fit = move |_| {
		if let Some(ref mut s) = *state_zf.borrow_mut() {
			s.zoom_to_fit();
		}
	};

	view! {
		<div class="network-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:click=on_click
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-zoom-controls" style="position: absolute; right: 1rem; bottom: 1rem;">
				<button on:click=zoom_fit>"Fit"</button>
				<button on:click=zoom_in>"+"</button>
				<button on:click=zoom_out>"-"</button>
			</div>
			{move || {
				tooltip
					.get()
					.map(|tip| {
						view! {
							<div
								class="graph-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none;",
									tip.x + 12.0,
									tip.y - 12.0,
								)
							>
								{tip.name}
							</div>
						}
					})
			}}
		</div>
	}
}
