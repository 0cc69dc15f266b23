use crate::graph::ir::ImportGraph;
use petgraph::algo::tarjan_scc;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashSet;

/// A group of files that import each other, directly or transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub id: usize,
    pub size: usize,
    /// Member names, sorted.
    pub members: Vec<String>,
    pub internal_edges: usize,
}

/// Strongly connected components with more than one file, or a single file
/// with an edge to itself.
pub fn find_cycles(graph: &ImportGraph) -> Vec<Cycle> {
    let mut cycles = Vec::new();

    for scc in tarjan_scc(graph) {
        let is_self_loop = scc.len() == 1 && {
            let node = scc[0];
            graph
                .edges_directed(node, petgraph::Direction::Outgoing)
                .any(|e| e.target() == node)
        };
        if scc.len() <= 1 && !is_self_loop {
            continue;
        }

        let scc_set: HashSet<_> = scc.iter().copied().collect();
        let internal_edges = scc
            .iter()
            .flat_map(|&node| graph.edges_directed(node, petgraph::Direction::Outgoing))
            .filter(|edge| scc_set.contains(&edge.target()))
            .count();

        let mut members: Vec<String> = scc.iter().map(|&idx| graph[idx].name.clone()).collect();
        members.sort();

        cycles.push(Cycle {
            id: 0,
            size: scc.len(),
            members,
            internal_edges,
        });
    }

    cycles.sort_by(|a, b| a.members.cmp(&b.members));
    for (id, cycle) in cycles.iter_mut().enumerate() {
        cycle.id = id;
    }
    cycles
}
