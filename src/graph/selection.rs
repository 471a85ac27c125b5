use std::collections::BTreeSet;

use log::{debug, warn};

use super::error::{Error, Result};
use super::model::GraphModel;
use super::types::{Node, NodeId};

/// Tracks the selected and highlighted ruler and writes highlight flags
/// into the model. Highlighting a node also selects it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionController {
	selected: Option<NodeId>,
	highlighted: Option<NodeId>,
}

impl SelectionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn selected(&self) -> Option<NodeId> {
		self.selected
	}

	pub fn highlighted(&self) -> Option<NodeId> {
		self.highlighted
	}

	/// Mark `id` as selected without touching highlights. Returns the record
	/// to show in the detail panel, or `None` for an unknown id.
	pub fn select_node<'a>(&mut self, model: &'a GraphModel, id: NodeId) -> Option<&'a Node> {
		let Ok(node) = model.find_node(id) else {
			warn!("Ignoring selection of unknown node {id}");
			return None;
		};
		self.selected = Some(id);
		Some(node)
	}

	/// Highlight a single node, dropping every previous highlight.
	pub fn highlight_node<'a>(&mut self, model: &'a mut GraphModel, id: NodeId) -> Option<&'a Node> {
		if !model.contains(id) {
			warn!("Ignoring highlight of unknown node {id}");
			return None;
		}
		model.reset_highlights();
		self.selected = Some(id);
		self.highlighted = Some(id);

		let node = model.find_node_mut(id).ok()?;
		node.is_highlighted = true;
		Some(node)
	}

	/// Highlight the highlighted node together with its direct predecessors
	/// and successors, plus every link running between members of that set.
	pub fn highlight_connections(&mut self, model: &mut GraphModel) -> Result<BTreeSet<NodeId>> {
		let id = self.highlighted.ok_or(Error::PreconditionNotMet)?;
		let connected = connected_set(model, id);
		debug!("Connected set of {id}: {connected:?}");

		model.reset_highlights();
		for node in model.nodes_mut() {
			node.is_highlighted = connected.contains(&node.id);
		}
		for link in model.links_mut() {
			link.is_highlighted = connected.contains(&link.source) && connected.contains(&link.target);
		}
		Ok(connected)
	}

	pub fn clear(&mut self, model: &mut GraphModel) {
		model.reset_highlights();
		self.highlighted = None;
		self.selected = None;
	}
}

/// `id` plus every node one link away from it, in either direction.
pub fn connected_set(model: &GraphModel, id: NodeId) -> BTreeSet<NodeId> {
	let mut set = BTreeSet::from([id]);
	for link in model.links() {
		if link.target == id {
			set.insert(link.source);
		}
		if link.source == id {
			set.insert(link.target);
		}
	}
	set
}
