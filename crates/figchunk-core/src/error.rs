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

//! Error types for the chunking engine.

use thiserror::Error;

/// Result type alias for chunking operations.
///
/// Named plainly (not `ChunkResult<T>`) because `ChunkResult` is already
/// the data-model type for a strategy's output (see `crate::model`).
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors a strategy or the orchestrator may surface.
///
/// Only `InvalidInput` and `DepthExceeded` are allowed to escape a
/// strategy; everything storage-related lives in `figchunk-storage`.
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Malformed id, empty merge input, unknown type tag, or a missing
    /// required field on the input document.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No strategy is registered for the requested (or detected) type.
    #[error("no strategy registered for type: {0}")]
    NoStrategy(String),

    /// Recursion went past the depth cap; the input is malformed or
    /// adversarial.
    #[error("chunking depth exceeded cap of {cap} at depth {depth}")]
    DepthExceeded {
        /// The depth at which the cap was hit.
        depth: usize,
        /// The configured cap.
        cap: usize,
    },

    /// Escape hatch for errors that don't fit the above, without losing
    /// their source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChunkError {
    /// Build an `InvalidInput` error with the given message.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        ChunkError::InvalidInput(msg.into())
    }

    /// Build a `NoStrategy` error naming the type that had no handler.
    pub fn no_strategy<S: Into<String>>(type_name: S) -> Self {
        ChunkError::NoStrategy(type_name.into())
    }

    /// Build a `DepthExceeded` error.
    pub fn depth_exceeded(depth: usize, cap: usize) -> Self {
        ChunkError::DepthExceeded { depth, cap }
    }

    /// True if this is an `InvalidInput` error.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ChunkError::InvalidInput(_))
    }

    /// True if this is a `NoStrategy` error.
    pub fn is_no_strategy(&self) -> bool {
        matches!(self, ChunkError::NoStrategy(_))
    }

    /// True if this is a `DepthExceeded` error.
    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self, ChunkError::DepthExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_roundtrip() {
        let err = ChunkError::invalid_input("missing id");
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid input: missing id");
    }

    #[test]
    fn depth_exceeded_message() {
        let err = ChunkError::depth_exceeded(101, 100);
        assert!(err.is_depth_exceeded());
        assert_eq!(
            err.to_string(),
            "chunking depth exceeded cap of 100 at depth 101"
        );
    }
}
