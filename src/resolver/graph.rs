//! Load order graph shared by the resolver and the order calculator.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Directed graph of mods where an edge `a -> b` means `a` loads before `b`.
pub(crate) struct LoadOrderGraph<K: Ord + Clone> {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    priorities: HashMap<NodeIndex, K>,
}

impl<K: Ord + Clone> LoadOrderGraph<K> {
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            priorities: HashMap::new(),
        }
    }

    /// Add a mod with the priority used among mods free to load.
    pub(crate) fn add_mod(&mut self, name: &str, priority: K) {
        let index = self.ensure_node(name);
        self.priorities.insert(index, priority);
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// Require `dependency` to load before `dependent`. Unknown names are ignored.
    pub(crate) fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let (Some(&from), Some(&to)) = (self.node_map.get(dependency), self.node_map.get(dependent))
        else {
            return;
        };
        if from != to && !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Topological order preferring the lowest priority among all free mods.
    ///
    /// Mods caught in a dependency cycle are appended in priority order
    /// instead of failing, a cycle must never stall an export.
    pub(crate) fn sorted(&self) -> Vec<String> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|index| (index, self.graph.neighbors_directed(index, Direction::Incoming).count()))
            .collect();

        let mut heap = BinaryHeap::new();
        for (&index, &degree) in &in_degree {
            if degree == 0 {
                heap.push(Reverse((self.priority(index), index)));
            }
        }

        let mut result = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, index))) = heap.pop() {
            result.push(self.graph[index].clone());
            for next in self.graph.neighbors_directed(index, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        heap.push(Reverse((self.priority(next), next)));
                    }
                }
            }
            in_degree.remove(&index);
        }

        if !in_degree.is_empty() {
            let mut remaining: Vec<NodeIndex> = in_degree.into_keys().collect();
            remaining.sort_by_key(|index| (self.priority(*index), *index));
            tracing::warn!(
                target: "resolver",
                "Dependency cycle between mods: {}",
                remaining.iter().map(|index| self.graph[*index].as_str()).collect::<Vec<_>>().join(", ")
            );
            result.extend(remaining.into_iter().map(|index| self.graph[index].clone()));
        }

        result
    }

    fn priority(&self, index: NodeIndex) -> Option<K> {
        self.priorities.get(&index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_before_priority() {
        let mut graph = LoadOrderGraph::new();
        graph.add_mod("a", 1);
        graph.add_mod("b", 2);
        graph.add_mod("c", 3);
        graph.add_dependency("a", "c");

        assert_eq!(graph.sorted(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_cycle_does_not_stall() {
        let mut graph = LoadOrderGraph::new();
        graph.add_mod("a", 1);
        graph.add_mod("b", 2);
        graph.add_mod("c", 3);
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "a");

        assert_eq!(graph.sorted(), vec!["c", "a", "b"]);
    }
}
