//! Grafo dirigido de dependencias entre steps.
//!
//! Los nodos son posiciones dentro de la definición (orden de inserción). El
//! orden topológico usa Kahn con desempate por orden de inserción, así dos
//! builds de la misma definición ejecutan los steps en el mismo orden.

use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Error de construcción: el nodo que quedó con grado de entrada > 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected(pub usize);

#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl StepGraph {
    pub fn with_nodes(count: usize) -> Self {
        let mut graph = DiGraph::with_capacity(count, count);
        let nodes = (0..count).map(|i| graph.add_node(i)).collect();
        Self { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arista `from -> to`: `to` depende de `from`. Posiciones fuera de rango
    /// se ignoran (la definición las valida antes).
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if let (Some(&a), Some(&b)) = (self.nodes.get(from), self.nodes.get(to)) {
            if self.graph.find_edge(a, b).is_none() {
                self.graph.add_edge(a, b, ());
            }
        }
    }

    /// Predecesores directos, ordenados por posición.
    pub fn upstream(&self, node: usize) -> Vec<usize> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Dependientes directos, ordenados por posición.
    pub fn downstream(&self, node: usize) -> Vec<usize> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Todos los predecesores transitivos de `node`.
    pub fn ancestors(&self, node: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<usize> = self.upstream(node).into();
        while let Some(n) = queue.pop_front() {
            if seen.insert(n) {
                queue.extend(self.upstream(n));
            }
        }
        seen
    }

    /// Orden topológico determinista (Kahn).
    pub fn toposort(&self) -> Result<Vec<usize>, CycleDetected> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for edge in self.graph.edge_references() {
            in_degree[self.graph[edge.target()]] += 1;
        }

        let mut ready: BTreeSet<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for child in self.downstream(next) {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck = (0..self.nodes.len()).find(|&i| in_degree[i] > 0).unwrap_or(0);
            return Err(CycleDetected(stuck));
        }
        Ok(order)
    }

    fn neighbors(&self, node: usize, dir: Direction) -> Vec<usize> {
        let Some(&idx) = self.nodes.get(node) else {
            return Vec::new();
        };
        let mut out: Vec<usize> = self.graph.neighbors_directed(idx, dir).map(|n| self.graph[n]).collect();
        out.sort_unstable();
        out
    }
}
