pub mod builder;
pub mod edge;

use std::collections::HashMap;

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use serde::{Deserialize, Serialize};

use edge::{CallEdge, DependencyEdge, InheritanceEdge};

/// The three graphs produced by the Graph Builder (C5), each with its own
/// `id -> NodeIndex` side index for O(1) lookup.
///
/// Three separate graphs — rather than one combined graph with a node-kind
/// discriminant — enforce the node-typing discipline (I5) by construction:
/// a class id has nowhere to go but the inheritance graph's index.
#[derive(Serialize, Deserialize)]
pub struct CodeGraph {
    pub dependency: StableGraph<String, DependencyEdge, Directed>,
    pub inheritance: StableGraph<String, InheritanceEdge, Directed>,
    pub call: StableGraph<String, CallEdge, Directed>,

    dependency_index: HashMap<String, NodeIndex>,
    inheritance_index: HashMap<String, NodeIndex>,
    call_index: HashMap<String, NodeIndex>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self {
            dependency: StableGraph::new(),
            inheritance: StableGraph::new(),
            call: StableGraph::new(),
            dependency_index: HashMap::new(),
            inheritance_index: HashMap::new(),
            call_index: HashMap::new(),
        }
    }

    pub fn ensure_dependency_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.dependency_index.get(id) {
            return idx;
        }
        let idx = self.dependency.add_node(id.to_string());
        self.dependency_index.insert(id.to_string(), idx);
        idx
    }

    pub fn ensure_inheritance_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.inheritance_index.get(id) {
            return idx;
        }
        let idx = self.inheritance.add_node(id.to_string());
        self.inheritance_index.insert(id.to_string(), idx);
        idx
    }

    pub fn ensure_call_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.call_index.get(id) {
            return idx;
        }
        let idx = self.call.add_node(id.to_string());
        self.call_index.insert(id.to_string(), idx);
        idx
    }

    /// Adds a dependency edge, refusing self-loops (I2).
    pub fn add_dependency_edge(&mut self, from: &str, to: &str, attrs: DependencyEdge) {
        if from == to {
            return;
        }
        let a = self.ensure_dependency_node(from);
        let b = self.ensure_dependency_node(to);
        self.dependency.add_edge(a, b, attrs);
    }

    pub fn add_inheritance_edge(&mut self, from: &str, to: &str, attrs: InheritanceEdge) {
        if from == to {
            return;
        }
        let a = self.ensure_inheritance_node(from);
        let b = self.ensure_inheritance_node(to);
        self.inheritance.add_edge(a, b, attrs);
    }

    pub fn add_call_edge(&mut self, from: &str, to: &str, attrs: CallEdge) {
        if from == to {
            return;
        }
        let a = self.ensure_call_node(from);
        let b = self.ensure_call_node(to);
        self.call.add_edge(a, b, attrs);
    }

    pub fn dependency_node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.dependency.node_weight(idx).map(String::as_str)
    }

    pub fn dependency_node_count(&self) -> usize {
        self.dependency_index.len()
    }

    pub fn inheritance_node_count(&self) -> usize {
        self.inheritance_index.len()
    }

    pub fn call_node_count(&self) -> usize {
        self.call_index.len()
    }

    pub fn dependency_edge_count(&self) -> usize {
        self.dependency.edge_count()
    }

    pub fn inheritance_edge_count(&self) -> usize {
        self.inheritance.edge_count()
    }

    pub fn call_edge_count(&self) -> usize {
        self.call.edge_count()
    }

    pub fn has_dependency_edge(&self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.dependency_index.get(from), self.dependency_index.get(to))
        else {
            return false;
        };
        self.dependency.contains_edge(a, b)
    }

    pub fn has_inheritance_edge(&self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.inheritance_index.get(from), self.inheritance_index.get(to))
        else {
            return false;
        };
        self.inheritance.contains_edge(a, b)
    }

    pub fn has_call_edge(&self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.call_index.get(from), self.call_index.get(to)) else {
            return false;
        };
        self.call.contains_edge(a, b)
    }

    /// Unions `other` into `self`: every node and edge of `other` is added,
    /// node identity keyed by id string (never by name).
    pub fn merge_from(&mut self, other: &CodeGraph) {
        for idx in other.dependency.node_indices() {
            self.ensure_dependency_node(&other.dependency[idx]);
        }
        for edge in other.dependency.edge_indices() {
            let (s, t) = other.dependency.edge_endpoints(edge).unwrap();
            self.add_dependency_edge(
                &other.dependency[s],
                &other.dependency[t],
                other.dependency[edge].clone(),
            );
        }

        for idx in other.inheritance.node_indices() {
            self.ensure_inheritance_node(&other.inheritance[idx]);
        }
        for edge in other.inheritance.edge_indices() {
            let (s, t) = other.inheritance.edge_endpoints(edge).unwrap();
            self.add_inheritance_edge(
                &other.inheritance[s],
                &other.inheritance[t],
                other.inheritance[edge].clone(),
            );
        }

        for idx in other.call.node_indices() {
            self.ensure_call_node(&other.call[idx]);
        }
        for edge in other.call.edge_indices() {
            let (s, t) = other.call.edge_endpoints(edge).unwrap();
            self.add_call_edge(&other.call[s], &other.call[t], other.call[edge].clone());
        }
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
