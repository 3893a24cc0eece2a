// FigChunk - content-aware chunking for design documents
// Copyright (C) 2025 FigChunk Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Directed graph of chunk-to-chunk links, with DFS cycle detection.
//! Not thread-safe by contract — callers confine an instance to a
//! single task or wrap it themselves.

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashMap;

/// Adjacency-set representation of the reference graph.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    edges: IndexMap<String, IndexSet<String>>,
    node_data: HashMap<String, Option<Value>>,
}

impl ReferenceGraph {
    /// A new, empty graph.
    pub fn new() -> Self {
        ReferenceGraph::default()
    }

    /// Register a node, optionally attaching auxiliary data. Calling
    /// this again on an existing node overwrites its data and leaves
    /// edges untouched.
    pub fn add_node(&mut self, id: impl Into<String>, data: Option<Value>) {
        let id = id.into();
        self.edges.entry(id.clone()).or_default();
        self.node_data.insert(id, data);
    }

    /// Add a directed edge `src -> dst`, auto-registering both endpoints.
    pub fn add_reference(&mut self, src: impl Into<String>, dst: impl Into<String>) {
        let src = src.into();
        let dst = dst.into();
        self.edges.entry(dst.clone()).or_default();
        self.edges.entry(src.clone()).or_default().insert(dst);
        self.node_data.entry(src).or_insert(None);
    }

    /// Ids `id` directly references, in insertion order. Empty if `id`
    /// is unknown.
    pub fn references(&self, id: &str) -> Vec<String> {
        self.edges
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids that directly reference `id` (a reverse scan over all edges).
    pub fn referenced_by(&self, id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains(id))
            .map(|(src, _)| src.clone())
            .collect()
    }

    /// Auxiliary data attached to `id`, if any was set.
    pub fn node_data(&self, id: &str) -> Option<&Value> {
        self.node_data.get(id).and_then(|v| v.as_ref())
    }

    /// All known node ids, in the order they were first registered.
    pub fn nodes(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    /// DFS cycle detection: visited set + recursion-stack, tracking the
    /// current path. On revisiting a node already on the stack, the
    /// slice of the path from that node forward (with the node
    /// re-appended to close the loop) is emitted. Every cycle found is
    /// retained — no deduplication by rotation.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut visited: IndexSet<String> = IndexSet::new();
        let mut cycles = Vec::new();

        for start in self.edges.keys() {
            if !visited.contains(start) {
                let mut stack: Vec<String> = Vec::new();
                self.dfs(start, &mut visited, &mut stack, &mut cycles);
            }
        }

        cycles
    }

    fn dfs(
        &self,
        node: &str,
        visited: &mut IndexSet<String>,
        stack: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node.to_string());
        stack.push(node.to_string());

        if let Some(targets) = self.edges.get(node) {
            for target in targets {
                if let Some(pos) = stack.iter().position(|n| n == target) {
                    let mut cycle: Vec<String> = stack[pos..].to_vec();
                    cycle.push(target.clone());
                    cycles.push(cycle);
                } else if !visited.contains(target) {
                    self.dfs(target, visited, stack, cycles);
                }
            }
        }

        stack.pop();
    }

    /// Export the graph as a plain `id -> [id]` map, e.g. for embedding
    /// into a diagnostic payload.
    pub fn export(&self) -> IndexMap<String, Vec<String>> {
        self.edges
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reference_auto_registers_endpoints() {
        let mut g = ReferenceGraph::new();
        g.add_reference("a", "b");
        assert_eq!(g.references("a"), vec!["b".to_string()]);
        assert_eq!(g.referenced_by("b"), vec!["a".to_string()]);
        assert!(g.references("b").is_empty());
    }

    #[test]
    fn s5_cycle_detection_three_node_loop() {
        let mut g = ReferenceGraph::new();
        g.add_reference("A", "B");
        g.add_reference("B", "C");
        g.add_reference("C", "A");

        let cycles = g.detect_cycles();
        assert!(!cycles.is_empty());
        let found_all = cycles.iter().any(|c| {
            let set: std::collections::HashSet<_> = c.iter().cloned().collect();
            set.contains("A") && set.contains("B") && set.contains("C")
        });
        assert!(found_all);
    }

    #[test]
    fn acyclic_graph_reports_no_cycles() {
        let mut g = ReferenceGraph::new();
        g.add_reference("root", "child1");
        g.add_reference("root", "child2");
        g.add_reference("child1", "grandchild");
        assert!(g.detect_cycles().is_empty());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut g = ReferenceGraph::new();
        g.add_reference("x", "x");
        let cycles = g.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["x".to_string(), "x".to_string()]);
    }

    #[test]
    fn export_round_trips_edges() {
        let mut g = ReferenceGraph::new();
        g.add_reference("a", "b");
        g.add_reference("a", "c");
        let exported = g.export();
        assert_eq!(exported.get("a").unwrap().len(), 2);
    }
}
