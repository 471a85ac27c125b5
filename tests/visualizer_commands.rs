//! Drives the graph core through its public command interface.

use std::collections::BTreeSet;

use imperial_graph::graph::{
	Command, Dataset, Error, Event, GraphVisualizer, NodeId, VisualizerConfig,
};

fn dataset(ids: &[NodeId], links: &[(NodeId, NodeId)]) -> Dataset {
	let nodes = ids
		.iter()
		.map(|id| format!(r#"{{"id": {id}, "username": "ruler{id}", "title": "Count", "label": "C"}}"#))
		.collect::<Vec<_>>()
		.join(",");
	let links = links
		.iter()
		.map(|(s, t)| format!(r#"{{"source": {s}, "target": {t}, "flank": 2}}"#))
		.collect::<Vec<_>>()
		.join(",");
	Dataset::from_json(&format!(r#"{{"nodes": [{nodes}], "links": [{links}]}}"#)).unwrap()
}

fn visualizer(ids: &[NodeId], links: &[(NodeId, NodeId)]) -> GraphVisualizer {
	GraphVisualizer::new(dataset(ids, links), VisualizerConfig::default()).unwrap()
}

fn highlighted(vis: &GraphVisualizer) -> (BTreeSet<NodeId>, Vec<(NodeId, NodeId)>) {
	let model = vis.model();
	(
		model.nodes().iter().filter(|n| n.is_highlighted).map(|n| n.id).collect(),
		model
			.links()
			.iter()
			.filter(|l| l.is_highlighted)
			.map(|l| (l.source, l.target))
			.collect(),
	)
}

#[test]
fn test_highlight_connections_marks_depth_one_neighbors() {
	let mut vis = visualizer(&[1, 2, 3, 4], &[(1, 2), (3, 1), (2, 4)]);
	vis.handle(Command::Highlight(1)).unwrap();
	let events = vis.handle(Command::HighlightConnections).unwrap();

	assert_eq!(events, vec![Event::HighlightChanged]);
	let (nodes, links) = highlighted(&vis);
	assert_eq!(nodes, BTreeSet::from([1, 2, 3]));
	assert_eq!(links, vec![(1, 2), (3, 1)]);
}

#[test]
fn test_highlight_connections_requires_highlight() {
	let mut vis = visualizer(&[1, 2], &[(1, 2)]);
	vis.handle(Command::Select(1)).unwrap();

	let result = vis.handle(Command::HighlightConnections);
	match result {
		Err(Error::PreconditionNotMet) => {}
		other => panic!("Expected PreconditionNotMet, got: {:?}", other),
	}
	assert!(!vis.model().has_highlight());
	assert!(Error::PreconditionNotMet.to_string().contains("select a node first"));
}

#[test]
fn test_clear_after_every_highlight_resets_flags() {
	let mut vis = visualizer(&[1, 2, 3], &[(1, 2), (2, 3), (3, 1)]);
	for id in [1, 2, 3] {
		vis.handle(Command::Highlight(id)).unwrap();
		vis.handle(Command::HighlightConnections).unwrap();
		vis.handle(Command::ClearSearch).unwrap();
		assert!(!vis.model().has_highlight());
		assert_eq!(vis.selection().highlighted(), None);
	}
}

#[test]
fn test_search_results_are_capped_and_ordered() {
	let ids: Vec<NodeId> = (1..=30).collect();
	let mut vis = visualizer(&ids, &[]);

	let events = vis.handle(Command::Search("RULER".into())).unwrap();
	let [Event::SearchResults(hits)] = events.as_slice() else {
		panic!("Expected a single result event, got: {:?}", events);
	};
	assert_eq!(hits.len(), 10);
	assert_eq!(hits.iter().map(|n| n.id).collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());

	assert!(vis.handle(Command::Search(String::new())).unwrap().is_empty());
	assert_eq!(
		vis.handle(Command::Search("999".into())).unwrap(),
		vec![Event::SearchResults(Vec::new())]
	);
}

#[test]
fn test_reset_view_has_no_core_state() {
	let mut vis = visualizer(&[1, 2], &[(1, 2)]);
	vis.handle(Command::Highlight(2)).unwrap();
	assert_eq!(vis.handle(Command::ResetView).unwrap(), vec![Event::ResetView]);
	assert_eq!(vis.selection().highlighted(), Some(2));
}

#[test]
fn test_dangling_link_refuses_to_start() {
	let broken = Dataset::from_json(
		r#"{"nodes": [{"id": 1, "username": "a", "title": "King"}], "links": [{"source": 1, "target": 2}]}"#,
	)
	.unwrap();

	match GraphVisualizer::new(broken, VisualizerConfig::default()) {
		Err(e) => assert!(e.is_data_integrity(), "unexpected error: {e}"),
		Ok(_) => panic!("Expected a data integrity error"),
	}
}

#[test]
fn test_layout_settles_and_stops_publishing() {
	let mut vis = visualizer(&[1, 2, 3, 4, 5], &[(1, 2), (1, 3), (2, 4), (3, 5)]);
	let mut ticks = 0;
	while let Some(snapshot) = vis.tick() {
		assert_eq!(snapshot.positions.len(), 5);
		ticks += 1;
		assert!(ticks < 1000, "layout did not settle");
	}
	assert!(vis.tick().is_none());
	assert!(!vis.is_layout_running());
}
