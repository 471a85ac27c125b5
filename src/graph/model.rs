use std::collections::HashMap;

use log::info;

use super::error::{Error, Result};
use super::types::{Dataset, Link, Node, NodeId, Position};

/// Owns the rulers and vassalage links for the whole session.
///
/// Membership is fixed at load time; only positions, pins and highlight flags
/// change afterwards, so the collections are handed out as slices.
#[derive(Clone, Debug)]
pub struct GraphModel {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<NodeId, usize>,
}

impl GraphModel {
	/// Validate a dataset and build the id lookup table.
	///
	/// Duplicate ids and links to unknown nodes are refused so that a broken
	/// graph never reaches the renderer.
	pub fn load(dataset: Dataset) -> Result<Self> {
		let Dataset { nodes, links } = dataset;

		let mut index = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			if index.insert(node.id, i).is_some() {
				return Err(Error::DuplicateNode(node.id));
			}
		}

		for link in &links {
			for endpoint in [link.source, link.target] {
				if !index.contains_key(&endpoint) {
					return Err(Error::MissingEndpoint {
						from: link.source,
						to: link.target,
						missing: endpoint,
					});
				}
			}
		}

		info!("Graph loaded: {} nodes, {} links", nodes.len(), links.len());
		let mut model = Self {
			nodes,
			links,
			index,
		};
		// Highlight flags only ever come from the selection controller.
		model.reset_highlights();
		Ok(model)
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub(crate) fn links_mut(&mut self) -> &mut [Link] {
		&mut self.links
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.index.contains_key(&id)
	}

	pub fn index_of(&self, id: NodeId) -> Option<usize> {
		self.index.get(&id).copied()
	}

	pub fn find_node(&self, id: NodeId) -> Result<&Node> {
		self.index_of(id)
			.map(|i| &self.nodes[i])
			.ok_or(Error::NodeNotFound(id))
	}

	pub fn find_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
		match self.index_of(id) {
			Some(i) => Ok(&mut self.nodes[i]),
			None => Err(Error::NodeNotFound(id)),
		}
	}

	/// Link endpoints as node indices, in link order.
	pub fn link_endpoints(&self) -> Vec<(usize, usize)> {
		self.links
			.iter()
			.map(|l| (self.index[&l.source], self.index[&l.target]))
			.collect()
	}

	pub fn reset_highlights(&mut self) {
		for node in &mut self.nodes {
			node.is_highlighted = false;
		}
		for link in &mut self.links {
			link.is_highlighted = false;
		}
	}

	pub fn has_highlight(&self) -> bool {
		self.nodes.iter().any(|n| n.is_highlighted) || self.links.iter().any(|l| l.is_highlighted)
	}

	/// Fix a node at `(x, y)`; the layout treats it as immovable until unpinned.
	pub fn pin(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
		let node = self.find_node_mut(id)?;
		if !x.is_finite() || !y.is_finite() {
			return Err(Error::NonFinitePosition { id, x, y });
		}
		node.fx = Some(x);
		node.fy = Some(y);
		node.x = x;
		node.y = y;
		Ok(())
	}

	pub fn unpin(&mut self, id: NodeId) -> Result<()> {
		let node = self.find_node_mut(id)?;
		node.fx = None;
		node.fy = None;
		Ok(())
	}

	pub fn snapshot(&self) -> Vec<Position> {
		self.nodes
			.iter()
			.map(|n| Position {
				id: n.id,
				x: n.x,
				y: n.y,
			})
			.collect()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::graph::types::Status;

	pub(crate) fn ruler(id: NodeId, username: &str, title: &str) -> Node {
		Node {
			id,
			label: "♜".into(),
			username: username.into(),
			title: title.into(),
			treasury: id * 1000,
			vassals: 0,
			status: Status::Active,
			flank_position: None,
			color: "#764ba2".into(),
			border_color: None,
			border_width: None,
			x: f64::NAN,
			y: f64::NAN,
			fx: None,
			fy: None,
			is_highlighted: false,
		}
	}

	pub(crate) fn link(source: NodeId, target: NodeId) -> Link {
		Link {
			source,
			target,
			flank: 1,
			is_highlighted: false,
		}
	}

	pub(crate) fn model(ids: &[NodeId], links: &[(NodeId, NodeId)]) -> GraphModel {
		GraphModel::load(Dataset {
			nodes: ids
				.iter()
				.map(|&id| ruler(id, &format!("user{id}"), "Baron"))
				.collect(),
			links: links.iter().map(|&(s, t)| link(s, t)).collect(),
		})
		.unwrap()
	}

	#[test]
	fn load_rejects_dangling_link() {
		let err = GraphModel::load(Dataset {
			nodes: vec![ruler(1, "a", "King")],
			links: vec![link(1, 42)],
		})
		.unwrap_err();
		assert!(err.is_data_integrity());
		assert!(matches!(
			err,
			Error::MissingEndpoint {
				from: 1,
				to: 42,
				missing: 42
			}
		));
	}

	#[test]
	fn load_rejects_duplicate_ids() {
		let err = GraphModel::load(Dataset {
			nodes: vec![ruler(7, "a", "King"), ruler(7, "b", "Duke")],
			links: vec![],
		})
		.unwrap_err();
		assert!(matches!(err, Error::DuplicateNode(7)));
	}

	#[test]
	fn find_node_reports_missing_id() {
		let model = model(&[1, 2], &[(1, 2)]);
		assert_eq!(model.find_node(2).unwrap().username, "user2");
		assert!(matches!(model.find_node(9), Err(Error::NodeNotFound(9))));
		assert!(!model.contains(9));
	}

	#[test]
	fn reset_highlights_clears_nodes_and_links() {
		let mut model = model(&[1, 2], &[(1, 2)]);
		model.nodes_mut()[0].is_highlighted = true;
		model.links_mut()[0].is_highlighted = true;
		assert!(model.has_highlight());

		model.reset_highlights();
		assert!(!model.has_highlight());
	}

	#[test]
	fn pin_moves_node_and_unpin_releases_it() {
		let mut model = model(&[1], &[]);
		model.pin(1, 10.0, 20.0).unwrap();
		let node = model.find_node(1).unwrap();
		assert_eq!((node.x, node.y), (10.0, 20.0));
		assert!(node.is_pinned());

		model.unpin(1).unwrap();
		assert!(!model.find_node(1).unwrap().is_pinned());
		assert!(model.pin(5, 0.0, 0.0).is_err());
	}

	#[test]
	fn pin_refuses_non_finite_coordinates() {
		let mut model = model(&[1], &[]);
		model.pin(1, 3.0, 4.0).unwrap();
		assert!(matches!(
			model.pin(1, f64::NAN, 0.0),
			Err(Error::NonFinitePosition { id: 1, .. })
		));
		assert!(model.pin(1, 0.0, f64::INFINITY).is_err());
		let node = model.find_node(1).unwrap();
		assert_eq!((node.x, node.y), (3.0, 4.0));
		assert_eq!((node.fx, node.fy), (Some(3.0), Some(4.0)));
	}

	#[test]
	fn load_drops_highlight_flags_from_input() {
		let mut first = ruler(1, "a", "King");
		first.is_highlighted = true;
		let mut second = ruler(2, "b", "Duke");
		second.is_highlighted = true;
		let mut vassalage = link(1, 2);
		vassalage.is_highlighted = true;

		let model = GraphModel::load(Dataset {
			nodes: vec![first, second],
			links: vec![vassalage],
		})
		.unwrap();
		assert!(!model.has_highlight());
	}
}
