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

//! Chunk id generation, parsing, and validation.
//!
//! Wire format: `fileKey:type:identifier`. `fileKey` and `type` never
//! contain `:`; `identifier` is one or more characters and also may not
//! contain `:` (the format is one level of `:`-splitting, not nested).

use crate::model::ChunkType;
use rand::RngCore;

/// A parsed chunk id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    /// Source document key.
    pub file_key: String,
    /// Chunk type.
    pub chunk_type: ChunkType,
    /// Caller-supplied or randomly generated identifier.
    pub identifier: String,
}

/// Build an id from its parts. If `identifier` is `None`, 8 random bytes
/// are hex-encoded into a 16-character token.
pub fn generate(file_key: &str, chunk_type: ChunkType, identifier: Option<&str>) -> String {
    let id_part = match identifier {
        Some(s) => s.to_string(),
        None => random_identifier(),
    };
    format!("{}:{}:{}", file_key, chunk_type.as_str(), id_part)
}

fn random_identifier() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Parse an id of the form `fileKey:type:identifier`. Mirrors
/// `^([^:]+):([^:]+)(?::([^:]+))?$`: all three groups exclude `:`, so an
/// extra colon anywhere makes the whole id unparsable.
pub fn parse(id: &str) -> Option<ParsedId> {
    let mut parts = id.splitn(3, ':');
    let file_key = parts.next()?;
    let type_str = parts.next()?;
    let identifier = parts.next()?;

    if file_key.is_empty() || type_str.is_empty() || identifier.is_empty() {
        return None;
    }
    if file_key.contains(':') || type_str.contains(':') || identifier.contains(':') {
        return None;
    }

    let chunk_type = ChunkType::parse(type_str)?;

    Some(ParsedId {
        file_key: file_key.to_string(),
        chunk_type,
        identifier: identifier.to_string(),
    })
}

/// True iff `parse` would succeed.
pub fn validate(id: &str) -> bool {
    parse(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_id_roundtrip() {
        let id = generate("abc", ChunkType::Node, Some("n1"));
        assert_eq!(id, "abc:node:n1");

        let parsed = parse(&id).unwrap();
        assert_eq!(parsed.file_key, "abc");
        assert_eq!(parsed.chunk_type, ChunkType::Node);
        assert_eq!(parsed.identifier, "n1");

        assert!(!validate("bad"));
    }

    #[test]
    fn generate_without_identifier_is_random_and_parseable() {
        let a = generate("fk", ChunkType::GlobalVars, None);
        let b = generate("fk", ChunkType::GlobalVars, None);
        assert_ne!(a, b);
        let parsed = parse(&a).unwrap();
        assert_eq!(parsed.identifier.len(), 16);
        assert!(parsed.identifier.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_rejects_wrong_arity_and_unknown_type() {
        assert!(parse("onlyonecolon").is_none());
        assert!(parse("a:b").is_none());
        assert!(parse("a:bogus:c").is_none());
        assert!(parse("a::c").is_none());
        assert!(parse(":node:c").is_none());
    }

    #[test]
    fn parse_rejects_extra_colons_in_identifier() {
        assert!(parse("a:node:b:c").is_none());
    }

    #[test]
    fn generate_renders_global_vars_wire_form() {
        let id = generate("fk", ChunkType::GlobalVars, Some("COLOR"));
        assert_eq!(id, "fk:globalVars:COLOR");
    }

    #[test]
    fn invariant_1_id_stable_for_same_triple() {
        let a = generate("fk", ChunkType::Metadata, Some("core"));
        let b = generate("fk", ChunkType::Metadata, Some("core"));
        assert_eq!(a, b);
    }
}
