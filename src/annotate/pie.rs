use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::annotate::color::ColorMap;
use crate::annotate::label::extract_accession_version;
use crate::metadata::MetadataIndex;
use crate::tree::NodeRef;

/// Colour used for pie segments whose value has no entry in the colour map.
pub const UNMAPPED_SEGMENT_COLOR: &str = "hsl(0, 0%, 60%)";

/// One slice of a collapsed-node summary chart. Segments for a node tile
/// `[0, 2π)` without gaps and their proportions sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSegment {
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: String,
    pub value: String,
    pub count: usize,
    pub proportion: f64,
}

/// All descendant leaves of `node` in child order; a leaf yields itself.
/// The externally built tree is acyclic, so depth is bounded by its height.
pub fn descendant_leaves(node: &NodeRef) -> Vec<&NodeRef> {
    if node.is_leaf() {
        return vec![node];
    }
    let mut leaves = Vec::new();
    for child in &node.children {
        leaves.extend(descendant_leaves(child));
    }
    leaves
}

/// Explicit-stack variant of [`descendant_leaves`] for very deep trees.
/// Produces the identical leaf order.
pub fn descendant_leaves_iter(node: &NodeRef) -> Vec<&NodeRef> {
    let mut leaves = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.is_leaf() {
            leaves.push(current);
        } else {
            stack.extend(current.children.iter().rev());
        }
    }
    leaves
}

/// Summarise the distribution of `field` over descendant leaves as pie
/// segments. Values are ordered by first encounter in traversal order, a
/// deliberate tie-break. An all-miss aggregate returns no segments; the
/// caller must suppress the chart rather than draw a degenerate pie.
pub fn pie_segments(
    descendants: &[&NodeRef],
    index: &MetadataIndex,
    field: &str,
    colors: &ColorMap,
) -> Vec<PieSegment> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;

    for leaf in descendants {
        let accession = extract_accession_version(&leaf.id);
        let value = match index.lookup(accession).and_then(|record| record.get(field)) {
            Some(value) => value,
            None => continue,
        };
        if !counts.contains_key(value) {
            order.push(value.clone());
        }
        *counts.entry(value.clone()).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(order.len());
    let mut current_angle = 0.0;
    for value in order {
        let count = counts[&value];
        let proportion = count as f64 / total as f64;
        let angle = proportion * TAU;
        let color = colors
            .get(&value)
            .unwrap_or(UNMAPPED_SEGMENT_COLOR)
            .to_string();
        segments.push(PieSegment {
            start_angle: current_angle,
            end_angle: current_angle + angle,
            color,
            value,
            count,
            proportion,
        });
        current_angle += angle;
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::color::build_color_map;
    use crate::metadata::{MetadataRecord, ACCESSION_FIELD};

    const TOLERANCE: f64 = 1e-9;

    fn record(pairs: &[(&str, &str)]) -> MetadataRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn country_fixture() -> (Vec<MetadataRecord>, MetadataIndex, NodeRef) {
        let records = vec![
            record(&[(ACCESSION_FIELD, "A1"), ("Country", "USA")]),
            record(&[(ACCESSION_FIELD, "A2"), ("Country", "USA")]),
            record(&[(ACCESSION_FIELD, "A3"), ("Country", "Canada")]),
        ];
        let index = MetadataIndex::build(records.clone());
        let node = NodeRef::internal(vec![
            NodeRef::leaf("A1|x"),
            NodeRef::internal(vec![NodeRef::leaf("A2|y"), NodeRef::leaf("A3|z")]),
        ]);
        (records, index, node)
    }

    #[test]
    fn collects_descendants_in_child_order() {
        let (_, _, node) = country_fixture();
        let leaves = descendant_leaves(&node);
        let ids: Vec<&str> = leaves.iter().map(|leaf| leaf.id.as_str()).collect();
        assert_eq!(ids, vec!["A1|x", "A2|y", "A3|z"]);
    }

    #[test]
    fn leaf_yields_itself() {
        let leaf = NodeRef::leaf("A1");
        let leaves = descendant_leaves(&leaf);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].id, "A1");
    }

    #[test]
    fn iterative_traversal_agrees_with_recursive() {
        let (_, _, node) = country_fixture();
        let recursive: Vec<&str> = descendant_leaves(&node)
            .iter()
            .map(|leaf| leaf.id.as_str())
            .collect();
        let iterative: Vec<&str> = descendant_leaves_iter(&node)
            .iter()
            .map(|leaf| leaf.id.as_str())
            .collect();
        assert_eq!(recursive, iterative);
    }

    #[test]
    fn aggregates_country_distribution() {
        let (records, index, node) = country_fixture();
        let colors = build_color_map(&records, "Country");
        let leaves = descendant_leaves(&node);
        let segments = pie_segments(&leaves, &index, "Country", &colors);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].value, "USA");
        assert_eq!(segments[0].count, 2);
        assert!((segments[0].proportion - 2.0 / 3.0).abs() < TOLERANCE);
        assert_eq!(segments[1].value, "Canada");
        assert_eq!(segments[1].count, 1);
        assert!((segments[1].proportion - 1.0 / 3.0).abs() < TOLERANCE);

        let proportion_sum: f64 = segments.iter().map(|s| s.proportion).sum();
        assert!((proportion_sum - 1.0).abs() < TOLERANCE);
        assert!((segments[1].end_angle - TAU).abs() < TOLERANCE);
        assert!((segments[0].end_angle - segments[1].start_angle).abs() < TOLERANCE);
        assert!(segments[0].start_angle.abs() < TOLERANCE);
    }

    #[test]
    fn segment_order_is_first_encountered_in_traversal() {
        let records = vec![
            record(&[(ACCESSION_FIELD, "A1"), ("Country", "Zimbabwe")]),
            record(&[(ACCESSION_FIELD, "A2"), ("Country", "Albania")]),
            record(&[(ACCESSION_FIELD, "A3"), ("Country", "Zimbabwe")]),
        ];
        let index = MetadataIndex::build(records.clone());
        let colors = build_color_map(&records, "Country");
        let node = NodeRef::internal(vec![
            NodeRef::leaf("A1"),
            NodeRef::leaf("A2"),
            NodeRef::leaf("A3"),
        ]);
        let leaves = descendant_leaves(&node);
        let segments = pie_segments(&leaves, &index, "Country", &colors);

        // Not alphabetical, not by count: traversal encounter order.
        let values: Vec<&str> = segments.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["Zimbabwe", "Albania"]);
    }

    #[test]
    fn empty_aggregate_returns_no_segments() {
        let (records, index, node) = country_fixture();
        let colors = build_color_map(&records, "Host");
        let leaves = descendant_leaves(&node);
        assert!(pie_segments(&leaves, &index, "Host", &colors).is_empty());
    }

    #[test]
    fn unmapped_values_fall_back_to_gray() {
        let (records, index, node) = country_fixture();
        // Colour map built for a different field has no Country entries.
        let colors = build_color_map(&records, "Host");
        let leaves = descendant_leaves(&node);
        let segments = pie_segments(&leaves, &index, "Country", &colors);
        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| s.color == UNMAPPED_SEGMENT_COLOR));
    }
}
