//! Graph core: data model, force layout, selection and search.
//!
//! Everything in here is plain data and runs on native targets as well as in
//! the browser; the canvas front end only talks to [`GraphVisualizer`].

mod error;
mod layout;
mod model;
mod search;
mod selection;
mod types;
mod visualizer;

pub use error::{Error, Result};
pub use layout::{ForceLayoutEngine, LayoutConfig, StepReport};
pub use model::GraphModel;
pub use search::{DEFAULT_SEARCH_LIMIT, search};
pub use selection::{SelectionController, connected_set};
pub use types::{Dataset, Flank, Link, Node, NodeId, Position, Status};
pub use visualizer::{Command, Event, GraphVisualizer, Snapshot, VisualizerConfig};
