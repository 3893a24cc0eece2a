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

//! Ambient Prometheus exposition of chunker and storage-adapter
//! operational metrics.
//!
//! This crate is deliberately separate from `figchunk_core::MetricsCollector`,
//! the in-memory, dependency-free per-type bucket tracker the
//! orchestrator writes to directly. This crate's
//! [`MetricsRegistry`] wraps a `prometheus::Registry` with additional
//! storage-layer metrics (operation latency/outcome by backend) that
//! the core crate has no business knowing about, and [`MetricsServer`]
//! exposes everything over HTTP for scraping.
//!
//! # Example
//!
//! ```ignore
//! use figchunk_metrics::{MetricsRegistry, MetricsServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = MetricsRegistry::new()?;
//!     let server = MetricsServer::new(registry.clone(), 9090);
//!     tokio::spawn(server.serve());
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod registry;
pub mod server;
pub mod types;

pub use collector::FigChunkCollector;
pub use registry::MetricsRegistry;
pub use server::MetricsServer;
pub use types::{MetricsConfig, OptimizerStage, StorageBackendLabel, StorageOperation};

// Re-export prometheus types for convenience.
pub use prometheus::{Encoder, TextEncoder};
