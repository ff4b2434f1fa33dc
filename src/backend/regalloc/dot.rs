//! Graphviz rendering of the allocator's graphs

use super::cfg::ControlGraph;
use super::coloring::Coloring;
use super::interference::InterferenceGraph;
use std::fmt::Write;

/// `digraph G { "i : instr" -> "j : instr"; ... }`, one statement per edge
pub fn control_graph_to_dot(cfg: &ControlGraph) -> String {
    let program = cfg.program();
    let node = |i: usize| format!("\"{} : {}\"", i, program[i]);

    let mut out = String::from("digraph G {\n");
    for (from, to) in cfg.edges() {
        // Writing into a String cannot fail
        let _ = writeln!(out, "  {} -> {};", node(from), node(to));
    }
    out.push('}');
    out
}

/// `graph G { a -- b; ... }`, with each node's color as its label when given
pub fn interference_to_dot(graph: &InterferenceGraph, coloring: Option<&Coloring>) -> String {
    let mut out = String::from("graph G {\n");

    if let Some(coloring) = coloring {
        let count = coloring.color_count().max(1) as f64;
        for reg in graph.nodes() {
            let Some(color) = coloring.color_of(reg) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  {reg} [label=\"{reg} : {color}\", style=filled, fillcolor=\"{:.3},0.4,1.0\"];",
                color as f64 / count
            );
        }
    } else {
        for reg in graph.nodes() {
            let _ = writeln!(out, "  {reg};");
        }
    }

    for (a, b) in graph.edges() {
        let _ = writeln!(out, "  {a} -- {b};");
    }
    out.push('}');
    out
}
