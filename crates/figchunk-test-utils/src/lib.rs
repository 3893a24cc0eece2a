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

//! Shared test fixtures and assertions for FigChunk crates:
//!
//! - Sample node trees, metadata envelopes, and global-variable
//!   dictionaries of varying size and shape.
//! - Chunk-domain assertions: size-budget compliance, id format,
//!   reference-graph integrity.

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::{GlobalVarsFixtures, MetadataFixtures, NodeTreeFixtures};
