use crate::graph::{GraphVisualizer, Node, NodeId};

pub const NODE_RADIUS: f64 = 25.0;
pub const HIGHLIGHT_RADIUS: f64 = 35.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;

pub fn node_radius(node: &Node) -> f64 {
	if node.is_highlighted {
		HIGHLIGHT_RADIUS
	} else {
		NODE_RADIUS
	}
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	/// Set once the pointer left the click slop; a drag that never moved is a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Node under the pointer, with the screen position for the tooltip.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<NodeId>,
	pub x: f64,
	pub y: f64,
}

/// Everything the canvas needs between frames: the graph core plus the
/// viewport and pointer gesture state.
pub struct CanvasState {
	pub visualizer: GraphVisualizer,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(mut visualizer: GraphVisualizer, width: f64, height: f64) -> Self {
		visualizer.resize(width, height);
		Self {
			visualizer,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position. Later nodes are drawn on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.visualizer
			.model()
			.nodes()
			.iter()
			.rev()
			.find(|node| (node.x - gx).hypot(node.y - gy) < node_radius(node))
			.map(|node| node.id)
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
	}

	/// One layout step; false once the layout has settled.
	pub fn tick(&mut self) -> bool {
		self.visualizer.advance().is_some()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.visualizer.resize(width, height);
	}
}
