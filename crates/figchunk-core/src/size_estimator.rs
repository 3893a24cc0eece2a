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

//! Byte-size estimation for arbitrary JSON values.
//!
//! The fast path serializes under canonical JSON encoding and measures the
//! UTF-8 byte length. `serde_json::Value` can't actually contain a cycle
//! (it's an owned tree), so the fallback traversal below is mostly a
//! defensive mirror of the recursive-cost algorithm rather than a path
//! that's ever hit in practice for this representation — it still exists
//! because the contract is "fall back on encoding failure", not "never
//! fall back".

use serde_json::Value;
use std::collections::HashSet;

/// Estimate the serialized byte size of `v`.
pub fn estimate(v: &Value) -> usize {
    match serde_json::to_vec(v) {
        Ok(bytes) => bytes.len(),
        Err(_) => {
            let mut visited = HashSet::new();
            estimate_fallback(v, &mut visited)
        }
    }
}

/// Recursive structural cost, used only when canonical encoding fails.
/// Fixed small costs for null/bool/
/// number, `len*2` for strings, `2 + Σ(element+1)` for sequences,
/// `2 + Σ(key+3+value+1)` for mappings, with a visited-set keyed by
/// pointer identity to break cycles.
fn estimate_fallback(v: &Value, visited: &mut HashSet<*const Value>) -> usize {
    let ptr = v as *const Value;
    if visited.contains(&ptr) {
        return 4;
    }
    visited.insert(ptr);

    let cost = match v {
        Value::Null => 4,
        Value::Bool(_) => 5,
        Value::Number(_) => 8,
        Value::String(s) => s.len() * 2,
        Value::Array(items) => {
            2 + items
                .iter()
                .map(|item| estimate_fallback(item, visited) + 1)
                .sum::<usize>()
        }
        Value::Object(map) => {
            2 + map
                .iter()
                .map(|(k, val)| k.len() + 3 + estimate_fallback(val, visited) + 1)
                .sum::<usize>()
        }
    };

    visited.remove(&ptr);
    cost
}

/// True if `v`'s estimated size exceeds `max`.
pub fn over(v: &Value, max: usize) -> bool {
    estimate(v) > max
}

/// True if a node value should be split rather than kept inline: it's
/// over budget, has more than 10 children, its `type` is `PAGE`/`CANVAS`,
/// or any of its `fills` has `type = IMAGE`.
pub fn should_split_node(v: &Value, max: usize) -> bool {
    if over(v, max) {
        return true;
    }

    if let Some(children) = v.get("children").and_then(Value::as_array) {
        if children.len() > 10 {
            return true;
        }
    }

    if let Some(node_type) = v.get("type").and_then(Value::as_str) {
        if node_type == "PAGE" || node_type == "CANVAS" {
            return true;
        }
    }

    if let Some(fills) = v.get("fills").and_then(Value::as_array) {
        let has_image_fill = fills.iter().any(|f| {
            f.get("type").and_then(Value::as_str) == Some("IMAGE")
        });
        if has_image_fill {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn estimate_matches_serialized_length() {
        let v = json!({"a": 1, "b": "hello"});
        let expected = serde_json::to_vec(&v).unwrap().len();
        assert_eq!(estimate(&v), expected);
    }

    #[test]
    fn over_respects_budget() {
        let small = json!({"a": 1});
        assert!(!over(&small, 1024));
        let big = json!({"a": "x".repeat(2000)});
        assert!(over(&big, 1024));
    }

    #[test]
    fn should_split_on_many_children() {
        let children: Vec<_> = (0..11).map(|i| json!({"id": i})).collect();
        let node = json!({"id": "n", "type": "FRAME", "children": children});
        assert!(should_split_node(&node, 1_000_000));
    }

    #[test]
    fn should_split_on_page_or_canvas_type() {
        let node = json!({"id": "n", "type": "PAGE"});
        assert!(should_split_node(&node, 1_000_000));
        let node = json!({"id": "n", "type": "CANVAS"});
        assert!(should_split_node(&node, 1_000_000));
    }

    #[test]
    fn should_split_on_image_fill() {
        let node = json!({
            "id": "n",
            "type": "RECTANGLE",
            "fills": [{"type": "SOLID"}, {"type": "IMAGE"}]
        });
        assert!(should_split_node(&node, 1_000_000));
    }

    #[test]
    fn should_not_split_small_leaf() {
        let node = json!({"id": "n", "type": "RECTANGLE", "fills": [{"type": "SOLID"}]});
        assert!(!should_split_node(&node, 1_000_000));
    }

    #[test]
    fn fallback_matches_algorithm_shape_for_simple_values() {
        let mut visited = HashSet::new();
        assert_eq!(estimate_fallback(&Value::Null, &mut visited), 4);
        assert_eq!(estimate_fallback(&json!("ab"), &mut visited), 4);
    }
}
