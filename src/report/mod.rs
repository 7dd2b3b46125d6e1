//! Plain-text rendering of a finished [`DownloadSession`].
//!
//! Presentation only — nothing in the pipeline reads these renderings back,
//! and the format is not load-bearing.

use crate::session::DownloadSession;
use crate::util::truncate_with_ellipsis;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

const RULE_WIDTH: usize = 60;
/// How many of a channel's errors to show before eliding the rest.
const ERRORS_SHOWN_PER_CHANNEL: usize = 3;

/// Human-readable file size, e.g. `1.5 MB`.
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{size_bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Render the full session summary: totals, per-channel breakdown, channels
/// with downloads, channels with errors, session errors.
pub fn render_summary(session: &DownloadSession) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "TGVAULT - SESSION SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Duration: {}s", session.duration().num_seconds());
    let _ = writeln!(out, "Channels processed: {}", session.total_channels);
    let _ = writeln!(out, "Total unread messages: {}", session.total_unread);
    let _ = writeln!(out, "Total media messages: {}", session.total_media);
    let _ = writeln!(out, "Total files downloaded: {}", session.total_downloaded);
    let _ = writeln!(out, "Success rate: {:.1}%", session.success_rate());
    if session.total_downloaded > 0 {
        let _ = writeln!(
            out,
            "Average files per active channel: {:.1}",
            session.average_files_per_channel()
        );
    }

    if !session.channel_stats.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "PER-CHANNEL BREAKDOWN");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<35} {:<8} {:<8} {:<12} {:<8}",
            "Channel", "Unread", "Media", "Downloaded", "Errors"
        );
        let _ = writeln!(out, "{}", "-".repeat(75));
        for stats in &session.channel_stats {
            let _ = writeln!(
                out,
                "{:<35} {:<8} {:<8} {:<12} {:<8}",
                truncate_with_ellipsis(&stats.name, 32),
                stats.unread_count,
                stats.media_count,
                stats.downloaded_count,
                stats.error_count()
            );
        }
    }

    let with_downloads = session.channels_with_downloads();
    if !with_downloads.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "CHANNELS WITH DOWNLOADS");
        let _ = writeln!(out, "{rule}");
        for stats in with_downloads {
            let _ = writeln!(
                out,
                "✓ {}: {} files ({:.1}% success rate)",
                stats.name,
                stats.downloaded_count,
                stats.success_rate()
            );
        }
    }

    let with_errors = session.channels_with_errors();
    if !with_errors.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "CHANNELS WITH ERRORS");
        let _ = writeln!(out, "{rule}");
        for stats in with_errors {
            let _ = writeln!(out, "⚠ {}: {} errors", stats.name, stats.error_count());
            for error in stats.errors.iter().take(ERRORS_SHOWN_PER_CHANNEL) {
                let _ = writeln!(out, "    - {error}");
            }
            if stats.error_count() > ERRORS_SHOWN_PER_CHANNEL {
                let _ = writeln!(
                    out,
                    "    ... and {} more errors",
                    stats.error_count() - ERRORS_SHOWN_PER_CHANNEL
                );
            }
        }
    }

    if !session.errors.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "SESSION ERRORS");
        let _ = writeln!(out, "{rule}");
        for error in &session.errors {
            let _ = writeln!(out, "❌ {error}");
        }
    }

    let _ = writeln!(out, "\n{rule}");
    out
}

/// Write the rendered summary to `path`.
pub fn write_summary_file(session: &DownloadSession, path: &Path) -> Result<()> {
    let mut body = render_summary(session);
    let _ = writeln!(body, "Start Time: {}", session.start_time.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(body, "End Time: {}", session.end_time.format("%Y-%m-%d %H:%M:%S UTC"));
    std::fs::write(path, body)
        .with_context(|| format!("failed to write session summary to {}", path.display()))
}
