//! Interference Graph
//!
//! Nodes are virtual registers, an edge means the two registers are live at
//! the same time somewhere and must not share a physical register.

use super::cfg::ControlGraph;
use super::liveness::{Liveness, gens, kills};
use crate::asm::VirtualReg;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected interference graph with ordered adjacency
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterferenceGraph {
    /// Adjacency list: reg -> set of interfering regs
    edges: BTreeMap<VirtualReg, BTreeSet<VirtualReg>>,
}

impl InterferenceGraph {
    /// Build the interference graph from converged liveness
    ///
    /// Each block is walked backwards from its exit set; a defined register
    /// interferes with everything live across its definition.
    pub fn build(cfg: &ControlGraph, liveness: &Liveness) -> Self {
        let mut graph = InterferenceGraph::default();

        for (block, vars) in cfg.blocks().iter().zip(liveness.blocks()) {
            let mut live = vars.exit.clone();

            for index in block.range().rev() {
                let instr = &cfg.program()[index].instr;

                if let Some(def) = kills(instr) {
                    graph.add_node(def);
                    for &other in &live {
                        if other != def {
                            graph.add_edge(def, other);
                        }
                    }
                    live.remove(&def);
                }
                live.extend(gens(instr));
            }
        }

        log::debug!(
            "interference graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }

    pub fn add_node(&mut self, reg: VirtualReg) {
        self.edges.entry(reg).or_default();
    }

    /// Add an edge between two registers
    pub fn add_edge(&mut self, a: VirtualReg, b: VirtualReg) {
        if a == b {
            return;
        }
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    /// All registers in the graph, ascending
    pub fn nodes(&self) -> impl Iterator<Item = VirtualReg> + '_ {
        self.edges.keys().copied()
    }

    pub fn contains(&self, reg: VirtualReg) -> bool {
        self.edges.contains_key(&reg)
    }

    /// Get neighbors of a register
    pub fn neighbors(&self, reg: VirtualReg) -> impl Iterator<Item = VirtualReg> + '_ {
        self.edges
            .get(&reg)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn interferes(&self, a: VirtualReg, b: VirtualReg) -> bool {
        self.edges.get(&a).is_some_and(|s| s.contains(&b))
    }

    /// Get the degree (number of neighbors) of a register
    pub fn degree(&self, reg: VirtualReg) -> usize {
        self.edges.get(&reg).map_or(0, |s| s.len())
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Undirected edges, each reported once as `(low, high)`
    pub fn edges(&self) -> impl Iterator<Item = (VirtualReg, VirtualReg)> + '_ {
        self.edges.iter().flat_map(|(&a, neighbors)| {
            neighbors
                .iter()
                .copied()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}
