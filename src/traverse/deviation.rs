use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::error::Error;
use crate::tree::{GameTree, Node, NodeId, MAINLINE_INDEX};

/// Overrides of the structural main line: node id to the edge index to follow there instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Deviations(BTreeMap<NodeId, usize>);

impl Deviations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, choice: usize) {
        self.0.insert(node, choice);
    }

    pub fn choice_at(&self, node: NodeId) -> Option<usize> {
        self.0.get(&node).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.0.iter().map(|(node, choice)| (*node, *choice))
    }

    /// Edge index to follow at `node`: the override if it names an existing edge, otherwise the
    /// structural main line.
    pub fn effective_choice(&self, node: &Node) -> usize {
        match self.choice_at(node.id) {
            Some(choice) if choice < node.edges.len() => choice,
            Some(choice) => {
                warn!(
                    "Ignoring override {} at node {} with {} edge(s)",
                    choice,
                    node.id,
                    node.edges.len()
                );
                MAINLINE_INDEX
            }
            None => MAINLINE_INDEX,
        }
    }

    /// Node ids visited when walking forward from the root under these overrides, ending at a
    /// terminal node.
    pub fn line(&self, tree: &GameTree) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut node = tree.root();
        loop {
            line.push(node.id);
            let Some(edge) = node.edges.get(self.effective_choice(node)) else {
                return line;
            };
            match tree.node(edge.destination) {
                Ok(next) => node = next,
                Err(_) => return line,
            }
        }
    }

    pub fn reaches(&self, tree: &GameTree, target: NodeId) -> bool {
        self.line(tree).contains(&target)
    }
}

impl FromIterator<(NodeId, usize)> for Deviations {
    fn from_iter<I: IntoIterator<Item = (NodeId, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The minimal set of overrides under which the main line passes through `target`.
///
/// Walks the origin links back to the root, so the cost is linear in the target's ply.
pub fn deviations_to_reach(tree: &GameTree, target: NodeId) -> Result<Deviations, Error> {
    let mut deviations = Deviations::new();
    let mut node = tree.node(target)?;
    while let Some(origin) = node.origin {
        if origin.choice_index != MAINLINE_INDEX {
            deviations.insert(origin.node_id, origin.choice_index);
        }
        node = tree.node(origin.node_id)?;
    }
    Ok(deviations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_tree, mv, TraceApplier};
    use crate::pgn::Token;

    #[test]
    fn test_root_needs_no_deviations() {
        let tree = demo_tree();
        assert!(deviations_to_reach(&tree, 0).unwrap().is_empty());
    }

    #[test]
    fn test_mainline_node_needs_no_deviations() {
        let tree = demo_tree();
        assert!(deviations_to_reach(&tree, 17).unwrap().is_empty());
        assert!(deviations_to_reach(&tree, 13).unwrap().is_empty());
    }

    #[test]
    fn test_nested_target() {
        let tree = demo_tree();
        let deviations = deviations_to_reach(&tree, 7).unwrap();
        assert_eq!(deviations.iter().collect::<Vec<_>>(), vec![(1, 1), (4, 1)]);
        let deviations = deviations_to_reach(&tree, 16).unwrap();
        assert_eq!(deviations.iter().collect::<Vec<_>>(), vec![(13, 1)]);
        let deviations = deviations_to_reach(&tree, 11).unwrap();
        assert_eq!(deviations.iter().collect::<Vec<_>>(), vec![(1, 2)]);
    }

    #[test]
    fn test_replay_reaches_every_node() {
        let tree = demo_tree();
        for id in tree.node_ids() {
            let deviations = deviations_to_reach(&tree, id).unwrap();
            assert!(deviations.reaches(&tree, id), "node {} not reached", id);
        }
    }

    #[test]
    fn test_default_line_is_structural_mainline() {
        let tree = demo_tree();
        assert_eq!(Deviations::new().line(&tree), vec![0, 1, 2, 12, 13, 14, 17]);
    }

    #[test]
    fn test_unknown_target() {
        let tree = demo_tree();
        assert!(matches!(deviations_to_reach(&tree, 99), Err(Error::UnknownNode(99))));
    }

    #[test]
    fn test_out_of_range_override_follows_mainline() {
        let tokens = vec![mv("e4"), mv("e5")];
        let tree = GameTree::build(&tokens, &TraceApplier).unwrap();
        let deviations: Deviations = [(1, 5)].into_iter().collect();
        assert_eq!(deviations.effective_choice(tree.node(1).unwrap()), 0);
        assert_eq!(deviations.line(&tree), vec![0, 1, 2]);
    }

    #[test]
    fn test_variation_scenario() {
        let tokens = vec![
            mv("e4"),
            mv("e5"),
            Token::VariationOpen,
            mv("Nf3"),
            Token::VariationClose,
            mv("Nc3"),
        ];
        let tree = GameTree::build(&tokens, &TraceApplier).unwrap();
        // The alternative to e5 branches from the node after e4.
        assert_eq!(deviations_to_reach(&tree, 3).unwrap().iter().collect::<Vec<_>>(), vec![(1, 1)]);
        assert!(deviations_to_reach(&tree, 4).unwrap().is_empty());
    }
}
