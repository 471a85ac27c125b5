use super::types::Node;

/// Number of hits shown in the results list.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Case-insensitive substring search over id, username and title.
///
/// Hits keep the original node order and are cut at `limit`. A blank query
/// is not a search at all and yields `None`.
pub fn search<'a>(nodes: &'a [Node], query: &str, limit: usize) -> Option<Vec<&'a Node>> {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() {
		return None;
	}
	Some(
		nodes
			.iter()
			.filter(|node| matches(node, &needle))
			.take(limit)
			.collect(),
	)
}

/// `needle` must already be lowercased.
fn matches(node: &Node, needle: &str) -> bool {
	node.id.to_string().contains(needle)
		|| node.username.to_lowercase().contains(needle)
		|| node.title.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::tests::ruler;

	fn nodes() -> Vec<Node> {
		vec![
			ruler(1, "Alaric", "Emperor"),
			ruler(12, "brann", "Duke"),
			ruler(21, "Cedric", "Baron of the North"),
			ruler(3, "dagmar", "Grand Duke"),
		]
	}

	fn ids(hits: &[&Node]) -> Vec<u64> {
		hits.iter().map(|n| n.id).collect()
	}

	#[test]
	fn blank_query_is_not_a_search() {
		assert!(search(&nodes(), "", 10).is_none());
		assert!(search(&nodes(), "   \t", 10).is_none());
	}

	#[test]
	fn unmatched_query_returns_empty_list() {
		assert_eq!(search(&nodes(), "999", 10).unwrap().len(), 0);
	}

	#[test]
	fn matches_id_username_and_title_case_insensitively() {
		let n = nodes();
		assert_eq!(ids(&search(&n, "1", 10).unwrap()), vec![1, 12, 21]);
		assert_eq!(ids(&search(&n, "  ALARIC ", 10).unwrap()), vec![1]);
		assert_eq!(ids(&search(&n, "duke", 10).unwrap()), vec![12, 3]);
		assert_eq!(ids(&search(&n, "north", 10).unwrap()), vec![21]);
	}

	#[test]
	fn results_are_capped() {
		let many: Vec<Node> = (1..=25).map(|id| ruler(id, &format!("knight{id}"), "Knight")).collect();
		let hits = search(&many, "knight", DEFAULT_SEARCH_LIMIT).unwrap();
		assert_eq!(hits.len(), 10);
		assert_eq!(ids(&hits), (1..=10).collect::<Vec<_>>());
	}
}
