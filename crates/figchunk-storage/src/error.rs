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

//! Storage adapter error taxonomy.

use thiserror::Error;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors a `StorageAdapter` may surface. Narrower than a general-purpose
/// backend error type: callers only ever need to distinguish
/// transient-vs-permanent failures plus lock contention, since everything
/// else (expiry, corrupt payloads) is swallowed and logged rather than
/// propagated.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend timeout, connection loss, or a transient command failure.
    /// Subject to the adapter's retry policy; surfaced after exhaustion.
    #[error("transient storage error: {0}")]
    StorageTransient(String),

    /// Serialization failure, schema mismatch, or integrity violation.
    /// Surfaced immediately, never retried.
    #[error("permanent storage error: {0}")]
    StoragePermanent(String),

    /// A lock is held by another writer and not yet stale. Callers
    /// downgrade this to a warning and proceed without the lock
    /// (availability over exclusivity).
    #[error("lock unavailable: {0}")]
    LockUnavailable(String),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transparent catch-all for wrapped error types.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorageError {
    /// Construct a `StorageTransient` error.
    pub fn transient<S: Into<String>>(msg: S) -> Self {
        StorageError::StorageTransient(msg.into())
    }

    /// Construct a `StoragePermanent` error.
    pub fn permanent<S: Into<String>>(msg: S) -> Self {
        StorageError::StoragePermanent(msg.into())
    }

    /// Construct a `LockUnavailable` error.
    pub fn lock_unavailable<S: Into<String>>(msg: S) -> Self {
        StorageError::LockUnavailable(msg.into())
    }

    /// Is this a transient (retryable) failure?
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::StorageTransient(_))
    }

    /// Is this a permanent (non-retryable) failure?
    pub fn is_permanent(&self) -> bool {
        matches!(self, StorageError::StoragePermanent(_))
    }

    /// Is this a lock-contention condition?
    pub fn is_lock_unavailable(&self) -> bool {
        matches!(self, StorageError::LockUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_roundtrip() {
        let err = StorageError::transient("connection reset");
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "transient storage error: connection reset");
    }

    #[test]
    fn permanent_roundtrip() {
        let err = StorageError::permanent("schema mismatch");
        assert!(err.is_permanent());
    }

    #[test]
    fn lock_unavailable_roundtrip() {
        let err = StorageError::lock_unavailable("held by pid 123");
        assert!(err.is_lock_unavailable());
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::other("read failed");
        let storage_err = StorageError::from(io_err);
        assert!(matches!(storage_err, StorageError::Io(_)));
    }
}
