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

//! The boundary contract with the out-of-scope tool-call gateway.
//!
//! This crate does not implement an RPC/SSE transport — that is the
//! gateway's job. It provides the typed request/response shapes the
//! gateway's two logical operations produce and consume, and a thin
//! [`GatewayClient`] facade that realizes them by composing a
//! `figchunk_core::Chunker` with a `figchunk_storage::StorageAdapter`.

pub mod client;
pub mod error;
pub mod types;

pub use client::GatewayClient;
pub use error::{GatewayError, GatewayResult};
pub use types::{FetchRequest, FetchResponse, IngestRequest, IngestResponse, StructureSummary};
