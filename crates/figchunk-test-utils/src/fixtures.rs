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

//! Sample documents for the three chunkable shapes: node trees,
//! metadata envelopes, and global-variable dictionaries.

use serde_json::{json, Map, Value};

/// Builds sample node trees of varying shape.
pub struct NodeTreeFixtures;

impl NodeTreeFixtures {
    /// A `FRAME` root with `child_count` `RECTANGLE` children, each
    /// padded with a `name` string so its serialized size is at least
    /// `child_size_bytes`.
    pub fn wide_tree(child_count: usize, child_size_bytes: usize) -> Value {
        let children: Vec<Value> = (0..child_count)
            .map(|i| Self::leaf_rectangle(&format!("0:{}", i + 2), child_size_bytes))
            .collect();

        json!({
            "id": "0:1",
            "name": "root",
            "type": "FRAME",
            "children": children,
        })
    }

    /// A chain of `depth` nested `FRAME`s, each with one child — the
    /// other axis strategies don't stress, but the node strategy's
    /// recursion depth cap (100) does.
    pub fn deep_tree(depth: usize) -> Value {
        let mut node = Self::leaf_rectangle(&format!("0:{}", depth + 1), 64);
        for level in (0..depth).rev() {
            node = json!({
                "id": format!("0:{}", level + 1),
                "name": format!("frame-{}", level),
                "type": "FRAME",
                "children": [node],
            });
        }
        node
    }

    /// A single leaf node with no children, padded to approximately
    /// `size_bytes` via its `name` field.
    pub fn leaf_rectangle(id: &str, size_bytes: usize) -> Value {
        let padding = "x".repeat(size_bytes.saturating_sub(64));
        json!({
            "id": id,
            "name": format!("rect-{padding}"),
            "type": "RECTANGLE",
            "x": 0.0,
            "y": 0.0,
            "width": 100.0,
            "height": 100.0,
            "fills": [],
        })
    }

    /// A node whose `fills` contains an `IMAGE` fill, forcing
    /// `shouldSplitNode` to split it regardless of size.
    pub fn image_filled_node(id: &str) -> Value {
        json!({
            "id": id,
            "name": "image-fill",
            "type": "RECTANGLE",
            "fills": [{"type": "IMAGE", "imageRef": "abc123"}],
        })
    }

    /// A `PAGE`/`CANVAS`-typed node, which `shouldSplitNode` always
    /// splits regardless of size.
    pub fn page_node(id: &str, children: Vec<Value>) -> Value {
        json!({
            "id": id,
            "name": "page",
            "type": "PAGE",
            "children": children,
        })
    }
}

/// Builds sample metadata envelopes.
pub struct MetadataFixtures;

impl MetadataFixtures {
    /// A metadata envelope with `component_count` components and
    /// `style_count` styles, plus a two-page document tree — enough
    /// structure to exercise the core/details/structure three-way
    /// split.
    pub fn envelope(component_count: usize, style_count: usize) -> Value {
        let mut components = Map::new();
        for i in 0..component_count {
            components.insert(
                format!("component-{i}"),
                json!({"name": format!("Component {i}"), "key": format!("key-{i}")}),
            );
        }

        let mut styles = Map::new();
        for i in 0..style_count {
            styles.insert(format!("style-{i}"), json!({"name": format!("Style {i}"), "styleType": "FILL"}));
        }

        json!({
            "name": "Sample File",
            "lastModified": "2026-01-01T00:00:00Z",
            "version": "42",
            "schemaVersion": 14,
            "thumbnailUrl": "https://example.invalid/thumb.png",
            "documentationLinks": [],
            "components": Value::Object(components),
            "styles": Value::Object(styles),
            "document": {
                "id": "0:0",
                "type": "DOCUMENT",
                "children": [
                    NodeTreeFixtures::page_node("0:1", vec![NodeTreeFixtures::leaf_rectangle("0:2", 64)]),
                    NodeTreeFixtures::page_node("0:3", vec![]),
                ],
            },
        })
    }

    /// The smallest valid envelope: no components, no styles, an empty
    /// document tree.
    pub fn minimal_envelope() -> Value {
        json!({
            "name": "Empty File",
            "lastModified": "2026-01-01T00:00:00Z",
            "version": "1",
            "schemaVersion": 14,
            "document": {"id": "0:0", "type": "DOCUMENT", "children": []},
        })
    }
}

/// Builds sample global-variable dictionaries, flat `id -> value` maps
/// ready to pass directly to the `globalVars` strategy.
pub struct GlobalVarsFixtures;

impl GlobalVarsFixtures {
    /// A dictionary with `count` entries of each known `VariableType`:
    /// `COLOR`, `TEXT_STYLE`, `EFFECT_STYLE`, and one
    /// `OTHER` entry that matches none of the inference rules.
    pub fn mixed_dictionary(count: usize) -> Value {
        let mut map = Map::new();
        for i in 0..count {
            map.insert(format!("color-{i}"), json!({"r": 0.1, "g": 0.2, "b": 0.3, "a": 1.0}));
            map.insert(
                format!("text-{i}"),
                json!({"fontFamily": "Inter", "fontSize": 14.0 + i as f64}),
            );
            map.insert(
                format!("effect-{i}"),
                json!({"effects": [{"type": "DROP_SHADOW", "radius": 4.0}]}),
            );
            map.insert(format!("other-{i}"), json!({"note": format!("entry {i}")}));
        }
        Value::Object(map)
    }

    /// A dictionary of `count` color entries only, each explicitly
    /// tagged `"type": "COLOR"` rather than relying on shape inference.
    pub fn colors_only(count: usize) -> Value {
        let mut map = Map::new();
        for i in 0..count {
            map.insert(
                format!("color-{i}"),
                json!({"type": "COLOR", "r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0}),
            );
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_tree_has_requested_child_count() {
        let tree = NodeTreeFixtures::wide_tree(12, 256);
        let children = tree.get("children").and_then(Value::as_array).unwrap();
        assert_eq!(children.len(), 12);
    }

    #[test]
    fn deep_tree_nests_to_requested_depth() {
        let mut node = NodeTreeFixtures::deep_tree(5);
        let mut depth = 0;
        loop {
            match node.get("children").and_then(Value::as_array) {
                Some(children) if !children.is_empty() => {
                    node = children[0].clone();
                    depth += 1;
                }
                _ => break,
            }
        }
        assert_eq!(depth, 5);
    }

    #[test]
    fn metadata_envelope_counts_match() {
        let envelope = MetadataFixtures::envelope(3, 2);
        assert_eq!(envelope["components"].as_object().unwrap().len(), 3);
        assert_eq!(envelope["styles"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn mixed_dictionary_contains_every_tag_shape() {
        let dict = GlobalVarsFixtures::mixed_dictionary(2);
        let map = dict.as_object().unwrap();
        assert!(map.keys().any(|k| k.starts_with("color-")));
        assert!(map.keys().any(|k| k.starts_with("text-")));
        assert!(map.keys().any(|k| k.starts_with("effect-")));
        assert!(map.keys().any(|k| k.starts_with("other-")));
    }
}
