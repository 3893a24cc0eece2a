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

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressFinish, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Progress tracker for chunking/storage operations.
pub struct ProgressTracker {
    multi: Arc<MultiProgress>,
    quiet: bool,
}

impl ProgressTracker {
    /// Create new progress tracker.
    /// Uses stderr for progress output to keep stdout clean for piping.
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: Arc::new(if quiet {
                MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
            } else {
                MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
            }),
            quiet,
        }
    }

    /// Progress bar for chunk-by-chunk work (e.g. persisting an
    /// ingest's produced chunks).
    #[allow(dead_code)]
    pub fn object_bar(&self, msg: &str, total: u64) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.yellow} {msg} [{bar:40.yellow/blue}] {pos}/{len} ({percent}%)")
                .unwrap()
                .progress_chars("█▓░"),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Spinner for indeterminate operations (a single `ingest`/`fetch`
    /// call). Auto-clears on completion for clean output.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = self
            .multi
            .add(ProgressBar::new_spinner().with_finish(ProgressFinish::AndClear));
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}").unwrap());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Whether progress bars are hidden (quiet mode).
    #[allow(dead_code)]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_tracker_hides_bars() {
        let tracker = ProgressTracker::new(true);
        assert!(tracker.is_quiet());
        assert!(tracker.spinner("chunking").is_hidden());
    }

    #[test]
    fn verbose_tracker_shows_bars() {
        let tracker = ProgressTracker::new(false);
        assert!(!tracker.is_quiet());
    }
}
