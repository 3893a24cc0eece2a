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

mod adapter;
mod commands;
mod output;
mod progress;
mod runtime;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use figchunk_observability::{init_tracing, LogFormat};
use std::io;

#[derive(Parser)]
#[command(name = "figchunk")]
#[command(version, about = "Content-aware chunking and storage for design documents")]
#[command(
    long_about = "figchunk breaks large design documents (nodes, metadata, global variables) into
size-bounded, individually fetchable chunks and persists them to a pluggable storage backend."
)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default figchunk.toml
    Init(InitCmd),

    /// Chunk a document and persist the result
    Ingest(IngestCmd),

    /// Fetch a single stored chunk
    Fetch(FetchCmd),

    /// List stored chunks
    List(ListCmd),

    /// Delete expired chunks
    Cleanup(CleanupCmd),

    /// Summarize stored chunks
    Stats(StatsCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        let level = if cli.verbose { "debug" } else { "info" };
        init_tracing(LogFormat::Pretty, Some(level)).ok();
    }

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        _ => {
            eprintln!("Invalid color option: {}", cli.color);
            std::process::exit(1);
        }
    }

    let result = match cli.command {
        Some(Commands::Init(cmd)) => cmd.execute().await,
        Some(Commands::Ingest(cmd)) => cmd.execute().await,
        Some(Commands::Fetch(cmd)) => cmd.execute().await,
        Some(Commands::List(cmd)) => cmd.execute().await,
        Some(Commands::Cleanup(cmd)) => cmd.execute().await,
        Some(Commands::Stats(cmd)) => cmd.execute().await,
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell)?;
            Ok(())
        }
        None => {
            output::header("figchunk - content-aware chunking for design documents");
            println!();
            println!("Usage: figchunk [OPTIONS] <COMMAND>");
            println!();
            println!("Available commands:");
            println!("  init       Write a default figchunk.toml");
            println!("  ingest     Chunk a document and persist the result");
            println!("  fetch      Fetch a single stored chunk");
            println!("  list       List stored chunks");
            println!("  cleanup    Delete expired chunks");
            println!("  stats      Summarize stored chunks");
            println!();
            println!("Run 'figchunk <COMMAND> --help' for command-specific help");
            Ok(())
        }
    };

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn print_version() {
    println!("figchunk {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "figchunk", &mut io::stdout());
    Ok(())
}
