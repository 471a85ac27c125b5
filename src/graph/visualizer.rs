use log::{debug, info, warn};
use serde::Deserialize;

use super::error::Result;
use super::layout::{ForceLayoutEngine, LayoutConfig, StepReport};
use super::model::GraphModel;
use super::search::{DEFAULT_SEARCH_LIMIT, search};
use super::selection::SelectionController;
use super::types::{Dataset, Node, NodeId, Position};

/// Canvas and behaviour settings for a [`GraphVisualizer`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
	pub width: f64,
	pub height: f64,
	pub search_limit: usize,
	pub layout: LayoutConfig,
}

impl Default for VisualizerConfig {
	fn default() -> Self {
		Self {
			width: 960.0,
			height: 700.0,
			search_limit: DEFAULT_SEARCH_LIMIT,
			layout: LayoutConfig::default(),
		}
	}
}

impl VisualizerConfig {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// User intents accepted from the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	Select(NodeId),
	Highlight(NodeId),
	HighlightConnections,
	Search(String),
	ClearSearch,
	ResetView,
	DragStart(NodeId),
	Drag { id: NodeId, x: f64, y: f64 },
	DragEnd(NodeId),
}

/// Notifications for the UI layer produced by a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
	/// Show this ruler in the detail panel; `None` restores the placeholder.
	Details(Option<Node>),
	/// Ordered hits; empty means nothing was found.
	SearchResults(Vec<Node>),
	SearchCleared,
	/// Highlight flags changed and need restyling.
	HighlightChanged,
	/// Viewport reset, handled entirely by the renderer.
	ResetView,
}

/// Positions published after a layout step.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
	pub alpha: f64,
	pub positions: Vec<Position>,
}

/// Owns the model and routes commands to selection, search and layout.
#[derive(Clone, Debug)]
pub struct GraphVisualizer {
	model: GraphModel,
	layout: ForceLayoutEngine,
	selection: SelectionController,
	config: VisualizerConfig,
}

impl GraphVisualizer {
	pub fn new(dataset: Dataset, config: VisualizerConfig) -> Result<Self> {
		let mut model = GraphModel::load(dataset)?;
		let mut layout = ForceLayoutEngine::new(
			&model,
			config.layout.clone(),
			(config.width / 2.0, config.height / 2.0),
		);
		layout.place_unplaced(&mut model);
		info!(
			"Visualizer ready on a {}x{} canvas",
			config.width, config.height
		);
		Ok(Self {
			model,
			layout,
			selection: SelectionController::new(),
			config,
		})
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub fn selection(&self) -> &SelectionController {
		&self.selection
	}

	pub fn config(&self) -> &VisualizerConfig {
		&self.config
	}

	pub fn is_layout_running(&self) -> bool {
		self.layout.is_running()
	}

	/// Move the centering target, e.g. after the canvas was resized.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.config.width = width;
		self.config.height = height;
		self.layout.set_center(width / 2.0, height / 2.0);
		self.layout.restart();
	}

	/// Advance the layout by one step. Returns `None` once it has settled.
	pub fn tick(&mut self) -> Option<Snapshot> {
		let report = self.advance()?;
		Some(Snapshot {
			alpha: report.alpha,
			positions: self.model.snapshot(),
		})
	}

	/// Like [`tick`](Self::tick) for callers that read positions straight
	/// from the model.
	pub fn advance(&mut self) -> Option<StepReport> {
		if !self.layout.is_running() {
			return None;
		}
		Some(self.layout.step(&mut self.model))
	}

	pub fn handle(&mut self, command: Command) -> Result<Vec<Event>> {
		debug!("Command: {command:?}");
		let events = match command {
			Command::Select(id) => match self.selection.select_node(&self.model, id) {
				Some(node) => vec![Event::Details(Some(node.clone()))],
				None => Vec::new(),
			},
			Command::Highlight(id) => match self.selection.highlight_node(&mut self.model, id) {
				Some(node) => vec![Event::HighlightChanged, Event::Details(Some(node.clone()))],
				None => Vec::new(),
			},
			Command::HighlightConnections => {
				self.selection.highlight_connections(&mut self.model)?;
				vec![Event::HighlightChanged]
			}
			Command::Search(query) => {
				match search(self.model.nodes(), &query, self.config.search_limit) {
					Some(hits) => vec![Event::SearchResults(hits.into_iter().cloned().collect())],
					None => Vec::new(),
				}
			}
			Command::ClearSearch => {
				self.selection.clear(&mut self.model);
				vec![
					Event::SearchCleared,
					Event::HighlightChanged,
					Event::Details(None),
				]
			}
			Command::ResetView => vec![Event::ResetView],
			Command::DragStart(id) => {
				let node = self.model.find_node(id)?;
				let (x, y) = (node.x, node.y);
				self.model.pin(id, x, y)?;
				self.layout.reheat(self.layout.config().drag_alpha_target);
				Vec::new()
			}
			Command::Drag { id, x, y } => {
				if self.model.find_node(id)?.is_pinned() {
					self.model.pin(id, x, y)?;
				} else {
					warn!("Ignoring drag of node {id} without a drag start");
				}
				Vec::new()
			}
			Command::DragEnd(id) => {
				self.model.unpin(id)?;
				self.layout.release();
				Vec::new()
			}
		};
		Ok(events)
	}
}
