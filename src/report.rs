//! Shape statistics of a built tree. A line is the path from the root to one terminal node.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::tree::GameTree;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeReport {
    pub number_of_nodes: usize,
    pub number_of_lines: usize,
    pub max_depth_of_a_line: usize,
    /// Half-moves played along the longest line.
    pub max_halfmove_length_of_a_line: u32,
    /// Terminal nodes per variation depth.
    pub depth_histogram: BTreeMap<usize, usize>,
    /// Terminal nodes per line length in half-moves.
    pub halfmove_length_histogram: BTreeMap<u32, usize>,
    /// All nodes per number of outgoing edges.
    pub out_degree_histogram: BTreeMap<usize, usize>,
    pub max_out_degree: usize,
    pub sum_of_depth_frequencies: usize,
    pub sum_of_length_frequencies: usize,
}

impl TreeReport {
    pub fn characterize(tree: &GameTree) -> Self {
        let mut report = TreeReport {
            number_of_nodes: tree.len(),
            max_out_degree: tree.max_out_degree(),
            ..Default::default()
        };

        for id in tree.terminal_ids() {
            let Ok(node) = tree.node(id) else { continue };
            // The terminal node's half-move number belongs to a move never made.
            let length = node.half_move_number - 1;
            report.number_of_lines += 1;
            report.max_depth_of_a_line = report.max_depth_of_a_line.max(node.depth);
            report.max_halfmove_length_of_a_line = report.max_halfmove_length_of_a_line.max(length);
            *report.depth_histogram.entry(node.depth).or_default() += 1;
            *report.halfmove_length_histogram.entry(length).or_default() += 1;
        }

        for node in tree.nodes() {
            *report.out_degree_histogram.entry(node.edges.len()).or_default() += 1;
        }

        report.sum_of_depth_frequencies = report.depth_histogram.values().sum();
        report.sum_of_length_frequencies = report.halfmove_length_histogram.values().sum();
        report
    }
}

fn write_histogram<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    histogram: &BTreeMap<K, usize>,
) -> fmt::Result {
    writeln!(f, "{}", title)?;
    for (key, frequency) in histogram {
        writeln!(f, "  {:>4}: {}", key, frequency)?;
    }
    Ok(())
}

impl fmt::Display for TreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Positions: {}", self.number_of_nodes)?;
        writeln!(f, "Lines: {}", self.number_of_lines)?;
        writeln!(f, "Longest line: {} half-moves", self.max_halfmove_length_of_a_line)?;
        writeln!(f, "Deepest line: depth {}", self.max_depth_of_a_line)?;
        writeln!(f, "Most moves from one position: {}", self.max_out_degree)?;
        write_histogram(f, "Lines by depth:", &self.depth_histogram)?;
        write_histogram(f, "Lines by length:", &self.halfmove_length_histogram)?;
        write_histogram(f, "Positions by number of moves:", &self.out_degree_histogram)
    }
}
