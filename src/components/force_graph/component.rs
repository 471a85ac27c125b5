use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::CanvasState;
use crate::graph::{Command, Event, Flank, GraphVisualizer, Node};

/// Pointer travel in pixels below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

type SharedState = Rc<RefCell<Option<CanvasState>>>;

/// Signals backing the sidebar. Sidebar widgets only post commands; the
/// animation loop drains them against the canvas state.
#[derive(Clone, Copy)]
struct Panel {
	query: RwSignal<String>,
	details: RwSignal<Option<Node>>,
	results: RwSignal<Option<Vec<Node>>>,
	notice: RwSignal<Option<String>>,
	pending: RwSignal<Vec<Command>>,
}

impl Panel {
	fn new() -> Self {
		Self {
			query: RwSignal::new(String::new()),
			details: RwSignal::new(None),
			results: RwSignal::new(None),
			notice: RwSignal::new(None),
			pending: RwSignal::new(Vec::new()),
		}
	}

	fn post(&self, command: Command) {
		self.pending.update(|queue| queue.push(command));
	}

	fn drain(&self) -> Vec<Command> {
		if self.pending.with_untracked(Vec::is_empty) {
			return Vec::new();
		}
		self.pending.try_update(std::mem::take).unwrap_or_default()
	}
}

fn apply(state: &mut CanvasState, panel: Panel, command: Command) {
	let events = match state.visualizer.handle(command) {
		Ok(events) => events,
		Err(err) => {
			warn!("{err}");
			panel.notice.set(Some(err.to_string()));
			return;
		}
	};
	if !events.is_empty() {
		panel.notice.set(None);
	}
	for event in events {
		match event {
			Event::Details(node) => panel.details.set(node),
			Event::SearchResults(hits) => panel.results.set(Some(hits)),
			Event::SearchCleared => {
				panel.query.set(String::new());
				panel.results.set(None);
			}
			Event::HighlightChanged => {}
			Event::ResetView => state.reset_view(),
		}
	}
}

fn with_state(state: &SharedState, f: impl FnOnce(&mut CanvasState)) {
	if let Some(ref mut s) = *state.borrow_mut() {
		f(s);
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Finish any gesture. A node press that never moved is a click and
/// highlights the node when `click` is set.
fn end_drag(s: &mut CanvasState, panel: Panel, click: bool) {
	if let Some(id) = s.drag.node.take() {
		apply(s, panel, Command::DragEnd(id));
		if click && !s.drag.moved {
			apply(s, panel, Command::Highlight(id));
		}
	}
	s.drag.moved = false;
	s.pan.active = false;
}

#[component]
pub fn ForceGraphCanvas(
	visualizer: GraphVisualizer,
	#[prop(default = false)] fullscreen: bool,
	#[prop(optional)] width: Option<f64>,
	#[prop(optional)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let panel = Panel::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(CanvasState::new(visualizer.clone(), w, h));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				with_state(&state_resize, |s| s.resize(nw, nh));
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				for command in panel.drain() {
					apply(s, panel, command);
				}
				s.tick();
				render::render(s, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		with_state(&state_md, |s| {
			if let Some(id) = s.node_at_position(x, y) {
				s.drag.node = Some(id);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.drag.moved = false;
				apply(s, panel, Command::Select(id));
				apply(s, panel, Command::DragStart(id));
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		with_state(&state_mm, |s| {
			s.hover.x = x;
			s.hover.y = y;
			if let Some(id) = s.drag.node {
				if (x - s.drag.start_x).hypot(y - s.drag.start_y) > CLICK_SLOP {
					s.drag.moved = true;
				}
				if s.drag.moved {
					let (gx, gy) = s.screen_to_graph(x, y);
					apply(s, panel, Command::Drag { id, x: gx, y: gy });
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			} else {
				s.hover.node = s.node_at_position(x, y);
			}
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, |s| end_drag(s, panel, true));
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, |s| {
			end_drag(s, panel, false);
			s.hover.node = None;
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		with_state(&state_wh, |s| s.zoom_at(x, y, factor));
	};

	let on_search_key = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" {
			panel.post(Command::Search(panel.query.get_untracked()));
		}
	};

	view! {
		<div class="graph-layout">
			<aside class="graph-sidebar">
				<div class="search-box">
					<input
						type="text"
						placeholder="ID, username or title"
						prop:value=move || panel.query.get()
						on:input=move |ev| panel.query.set(event_target_value(&ev))
						on:keydown=on_search_key
					/>
					<button
						class="btn"
						on:click=move |_| panel.post(Command::Search(panel.query.get_untracked()))
					>
						"Search"
					</button>
					<button class="btn" on:click=move |_| panel.post(Command::ClearSearch)>
						"Clear"
					</button>
				</div>
				{move || {
					panel
						.results
						.get()
						.map(|hits| view! { <div class="search-results">{search_results(panel, hits)}</div> })
				}}
				<div class="graph-actions">
					<button class="btn" on:click=move |_| panel.post(Command::HighlightConnections)>
						"Highlight connections"
					</button>
					<button class="btn" on:click=move |_| panel.post(Command::ResetView)>
						"Reset view"
					</button>
				</div>
				{move || panel.notice.get().map(|msg| view! { <div class="notice">{msg}</div> })}
				<div class="node-info">{move || node_details(panel, panel.details.get())}</div>
			</aside>
			<div class="graph-area">
				<canvas
					node_ref=canvas_ref
					class="force-graph-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style="display: block; cursor: grab;"
				/>
			</div>
		</div>
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn search_results(panel: Panel, hits: Vec<Node>) -> AnyView {
	if hits.is_empty() {
		return view! { <div class="search-result-item">"Nothing found"</div> }.into_any();
	}
	hits.into_iter()
		.map(|node| {
			let id = node.id;
			let heading = format!("{} {}", node.label, node.username);
			let details = format!(
				"ID: {} | {} | {} PZM",
				node.id,
				node.title,
				node.treasury_display()
			);
			view! {
				<div class="search-result-item" on:click=move |_| panel.post(Command::Highlight(id))>
					<div class="search-result-username">{heading}</div>
					<div class="search-result-details">{details}</div>
				</div>
			}
		})
		.collect_view()
		.into_any()
}

fn node_details(panel: Panel, node: Option<Node>) -> AnyView {
	let Some(node) = node else {
		return view! {
			<h3>"Select a ruler"</h3>
			<p>"Click any node or find one through search"</p>
		}
		.into_any();
	};
	let id = node.id;
	view! {
		<h3>{format!("{} {}", node.label, node.username)}</h3>
		<div class="node-details">
			<p><strong>"ID: "</strong>{id.to_string()}</p>
			<p><strong>"Title: "</strong>{node.title.clone()}</p>
			<p><strong>"Treasury: "</strong>{format!("{} PZM", node.treasury_display())}</p>
			<p><strong>"Vassals: "</strong>{node.vassals.to_string()}</p>
			<p><strong>"Status: "</strong>{node.status.display_name()}</p>
			<p><strong>"Flank: "</strong>{Flank::display_name(node.flank_position)}</p>
		</div>
		<button class="btn" on:click=move |_| panel.post(Command::Highlight(id))>
			"Highlight this ruler"
		</button>
	}
	.into_any()
}
