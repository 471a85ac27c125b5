use super::types::NodeId;

/// Failures raised by the graph core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Lookup by id failed. Callers are expected to check `contains` first.
	#[error("node {0} does not exist")]
	NodeNotFound(NodeId),

	/// `HighlightConnections` was requested with no highlighted node.
	#[error("select a node first: click a node or find one through search")]
	PreconditionNotMet,

	/// A link points at a node id that is not part of the dataset.
	#[error("link {from} -> {to} references missing node {missing}")]
	MissingEndpoint {
		from: NodeId,
		to: NodeId,
		missing: NodeId,
	},

	/// A pin was requested at a coordinate the layout cannot integrate.
	#[error("cannot pin node {id} at ({x}, {y})")]
	NonFinitePosition { id: NodeId, x: f64, y: f64 },

	/// Two nodes share the same id.
	#[error("duplicate node id {0}")]
	DuplicateNode(NodeId),

	/// The dataset document could not be decoded.
	#[error("malformed dataset: {0}")]
	Parse(#[from] serde_json::Error),
}

impl Error {
	/// True for errors that make the dataset unusable at start-up.
	pub fn is_data_integrity(&self) -> bool {
		matches!(self, Error::MissingEndpoint { .. } | Error::DuplicateNode(_))
	}
}

/// Result alias used throughout the graph core.
pub type Result<T> = std::result::Result<T, Error>;
