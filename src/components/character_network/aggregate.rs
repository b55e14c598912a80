//! Per-character interaction tallies.

use std::collections::{HashMap, HashSet};

use crate::components::force_graph::{GraphLink, GraphNode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partner {
	pub name: String,
	pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionSummary {
	pub id: String,
	pub total: usize,
	pub partners: Vec<Partner>,
}

/// Tallies undirected interactions per node.
///
/// Each link counts once for each side, so a self-loop lists the node as its
/// own partner twice. Nodes without interactions are left out. Partners are
/// ranked by count, ties keeping the order they were first seen in `links`.
pub fn aggregate(nodes: &[GraphNode], links: &[GraphLink]) -> Vec<InteractionSummary> {
	let mut interactions: HashMap<&str, Vec<Partner>> = HashMap::new();
	for link in links {
		let (Some(source), Some(target)) = (link.source.id(), link.target.id()) else {
			continue;
		};
		record(&mut interactions, source, target);
		record(&mut interactions, target, source);
	}

	let mut seen = HashSet::new();
	nodes
		.iter()
		.filter(|node| seen.insert(node.id.as_str()))
		.filter_map(|node| {
			let mut partners = interactions.get(node.id.as_str())?.clone();
			partners.sort_by(|a, b| b.count.cmp(&a.count));
			Some(InteractionSummary {
				id: node.id.clone(),
				total: partners.iter().map(|p| p.count).sum(),
				partners,
			})
		})
		.collect()
}

fn record<'a>(interactions: &mut HashMap<&'a str, Vec<Partner>>, from: &'a str, to: &str) {
	let partners = interactions.entry(from).or_default();
	match partners.iter_mut().find(|p| p.name == to) {
		Some(p) => p.count += 1,
		None => partners.push(Partner {
			name: to.to_string(),
			count: 1,
		}),
	}
}

/// `- Romeo (3): Juliet (2), Tybalt (1)`
pub fn format_line(summary: &InteractionSummary) -> String {
	let partners: Vec<String> = summary
		.partners
		.iter()
		.map(|p| format!("{} ({})", p.name, p.count))
		.collect();
	format!("- {} ({}): {}", summary.id, summary.total, partners.join(", "))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::LinkEnd;

	fn nodes(ids: &[&str]) -> Vec<GraphNode> {
		ids.iter()
			.map(|id| GraphNode { id: id.to_string() })
			.collect()
	}

	fn partners(list: &[(&str, usize)]) -> Vec<Partner> {
		list.iter()
			.map(|&(name, count)| Partner {
				name: name.to_string(),
				count,
			})
			.collect()
	}

	#[test]
	fn counts_repeated_pairs() {
		let links = vec![
			GraphLink::new("A", "B"),
			GraphLink::new("A", "B"),
			GraphLink::new("A", "C"),
		];
		let summary = aggregate(&nodes(&["A", "B", "C"]), &links);

		assert_eq!(
			summary,
			vec![
				InteractionSummary {
					id: "A".into(),
					total: 3,
					partners: partners(&[("B", 2), ("C", 1)]),
				},
				InteractionSummary {
					id: "B".into(),
					total: 2,
					partners: partners(&[("A", 2)]),
				},
				InteractionSummary {
					id: "C".into(),
					total: 1,
					partners: partners(&[("A", 1)]),
				},
			]
		);
	}

	#[test]
	fn isolated_nodes_are_omitted() {
		let links = vec![GraphLink::new("A", "B")];
		let summary = aggregate(&nodes(&["Loner", "A", "B"]), &links);
		let ids: Vec<&str> = summary.iter().map(|s| s.id.as_str()).collect();
		assert_eq!(ids, ["A", "B"]);
	}

	#[test]
	fn ties_keep_first_encounter_order() {
		let links = vec![
			GraphLink::new("A", "D"),
			GraphLink::new("C", "A"),
			GraphLink::new("A", "B"),
			GraphLink::new("B", "A"),
		];
		let summary = aggregate(&nodes(&["A"]), &links);
		assert_eq!(summary[0].partners, partners(&[("B", 2), ("D", 1), ("C", 1)]));
	}

	#[test]
	fn total_matches_incident_links() {
		let links = vec![
			GraphLink::new("A", "A"),
			GraphLink::new("A", "B"),
			GraphLink::new("B", "C"),
			GraphLink::new("C", "A"),
			GraphLink::new("A", "C"),
		];
		let summary = aggregate(&nodes(&["A", "B", "C"]), &links);
		let totals: Vec<usize> = summary.iter().map(|s| s.total).collect();
		// A: self-loop twice, plus B, C, C.
		assert_eq!(totals, [5, 2, 3]);
		assert_eq!(summary[0].partners[0], partners(&[("A", 2)])[0]);
	}

	#[test]
	fn object_endpoints_and_missing_ids() {
		let links = vec![
			GraphLink {
				source: LinkEnd::Node {
					id: Some("A".into()),
				},
				target: "B".into(),
			},
			GraphLink {
				source: LinkEnd::Node { id: None },
				target: "B".into(),
			},
		];
		let summary = aggregate(&nodes(&["A", "B"]), &links);
		assert_eq!(summary.len(), 2);
		assert_eq!(summary[1].total, 1);
	}

	#[test]
	fn duplicate_node_ids_listed_once() {
		let links = vec![GraphLink::new("A", "B")];
		let summary = aggregate(&nodes(&["A", "B", "A"]), &links);
		assert_eq!(summary.len(), 2);
	}

	#[test]
	fn empty_inputs() {
		assert!(aggregate(&[], &[]).is_empty());
		assert!(aggregate(&nodes(&["A"]), &[]).is_empty());
	}

	#[test]
	fn formats_summary_line() {
		let summary = aggregate(
			&nodes(&["Romeo"]),
			&[
				GraphLink::new("Romeo", "Juliet"),
				GraphLink::new("Juliet", "Romeo"),
				GraphLink::new("Romeo", "Tybalt"),
			],
		);
		assert_eq!(format_line(&summary[0]), "- Romeo (3): Juliet (2), Tybalt (1)");
	}
}
