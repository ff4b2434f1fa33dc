//! Graph Coloring
//!
//! Welsh–Powell greedy coloring of the interference graph. Colors are small
//! integers; the allocator maps color `c` to a physical register.

use super::interference::InterferenceGraph;
use crate::asm::VirtualReg;
use std::collections::{BTreeMap, BTreeSet};

/// Color assigned to each register of an interference graph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coloring {
    colors: BTreeMap<VirtualReg, usize>,
    count: usize,
}

impl Coloring {
    /// Color `graph` greedily, highest degree first
    ///
    /// Ties are broken by ascending register id so the result depends on
    /// nothing but the adjacency.
    pub fn welsh_powell(graph: &InterferenceGraph) -> Self {
        let mut order: Vec<(VirtualReg, usize)> =
            graph.nodes().map(|reg| (reg, graph.degree(reg))).collect();
        order.sort_by(|(a, deg_a), (b, deg_b)| deg_b.cmp(deg_a).then(a.cmp(b)));

        let mut colors: BTreeMap<VirtualReg, usize> = BTreeMap::new();
        let mut count = 0;

        for (node, _) in order {
            // Find colors used by neighbors
            let taken: BTreeSet<usize> = graph
                .neighbors(node)
                .filter_map(|n| colors.get(&n).copied())
                .collect();

            let color = (0..).find(|c| !taken.contains(c)).unwrap_or_default();
            colors.insert(node, color);
            count = count.max(color + 1);
        }

        log::debug!(
            "colored {} registers with {} colors",
            colors.len(),
            count
        );

        Self { colors, count }
    }

    /// Color of `reg`, `None` when the register is not in the graph
    pub fn color_of(&self, reg: VirtualReg) -> Option<usize> {
        self.colors.get(&reg).copied()
    }

    /// Number of distinct colors used
    pub fn color_count(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> impl Iterator<Item = (VirtualReg, usize)> + '_ {
        self.colors.iter().map(|(&reg, &color)| (reg, color))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether no edge of `graph` joins two registers of the same color
    pub fn is_valid_for(&self, graph: &InterferenceGraph) -> bool {
        graph
            .edges()
            .all(|(a, b)| self.color_of(a) != self.color_of(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u32) -> VirtualReg {
        VirtualReg(n)
    }

    #[test]
    fn test_empty_graph_needs_no_colors() {
        let coloring = Coloring::welsh_powell(&InterferenceGraph::default());
        assert_eq!(coloring.color_count(), 0);
        assert!(coloring.is_empty());
        assert_eq!(coloring.color_of(v(0)), None);
    }

    #[test]
    fn test_isolated_nodes_share_color_zero() {
        let mut graph = InterferenceGraph::default();
        graph.add_node(v(0));
        graph.add_node(v(1));
        let coloring = Coloring::welsh_powell(&graph);
        assert_eq!(coloring.color_of(v(0)), Some(0));
        assert_eq!(coloring.color_of(v(1)), Some(0));
        assert_eq!(coloring.color_count(), 1);
    }

    #[test]
    fn test_triangle_needs_three_colors() {
        let mut graph = InterferenceGraph::default();
        graph.add_edge(v(0), v(1));
        graph.add_edge(v(1), v(2));
        graph.add_edge(v(0), v(2));
        let coloring = Coloring::welsh_powell(&graph);
        assert_eq!(coloring.color_count(), 3);
        assert!(coloring.is_valid_for(&graph));
    }

    #[test]
    fn test_highest_degree_colored_first() {
        // Star around v5: the hub gets color 0, every leaf color 1
        let mut graph = InterferenceGraph::default();
        for leaf in 0..4 {
            graph.add_edge(v(5), v(leaf));
        }
        let coloring = Coloring::welsh_powell(&graph);
        assert_eq!(coloring.color_of(v(5)), Some(0));
        for leaf in 0..4 {
            assert_eq!(coloring.color_of(v(leaf)), Some(1));
        }
        assert_eq!(coloring.color_count(), 2);
    }

    #[test]
    fn test_ties_broken_by_register_id() {
        let mut graph = InterferenceGraph::default();
        graph.add_edge(v(3), v(1));
        let coloring = Coloring::welsh_powell(&graph);
        assert_eq!(coloring.color_of(v(1)), Some(0));
        assert_eq!(coloring.color_of(v(3)), Some(1));
    }

    #[test]
    fn test_same_graph_same_coloring() {
        let mut a = InterferenceGraph::default();
        let mut b = InterferenceGraph::default();
        for (x, y) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)] {
            a.add_edge(v(x), v(y));
        }
        for (x, y) in [(0, 2), (3, 0), (2, 3), (1, 2), (0, 1)] {
            b.add_edge(v(x), v(y));
        }
        assert_eq!(Coloring::welsh_powell(&a), Coloring::welsh_powell(&b));
    }
}
