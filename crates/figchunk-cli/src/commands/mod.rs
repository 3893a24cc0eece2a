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

// Command modules for the FigChunk CLI
pub mod cleanup;
pub mod fetch;
pub mod init;
pub mod ingest;
pub mod list;
pub mod stats;

pub use cleanup::CleanupCmd;
pub use fetch::FetchCmd;
pub use init::InitCmd;
pub use ingest::IngestCmd;
pub use list::ListCmd;
pub use stats::StatsCmd;
