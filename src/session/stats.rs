//! Statistics model for channel processing and whole sessions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Counters and errors for one processed channel.
///
/// Created with zero counters when processing starts, mutated only by the
/// channel processor, and immutable once appended to the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelStats {
    pub name: String,
    pub unread_count: usize,
    /// Unread messages that passed the media filter. Always <= `unread_count`.
    pub media_count: usize,
    /// Eligible messages resolved to a file on disk. Always <= `media_count`.
    pub downloaded_count: usize,
    /// Per-message and channel-level error descriptions, in processing order.
    pub errors: Vec<String>,
}

impl ChannelStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Downloaded share of eligible media, as a percentage. A channel with no
    /// eligible media counts as fully successful.
    pub fn success_rate(&self) -> f64 {
        if self.media_count == 0 {
            return 100.0;
        }
        self.downloaded_count as f64 / self.media_count as f64 * 100.0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

impl fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChannelStats(name='{}', unread={}, media={}, downloaded={}, success_rate={:.1}%, errors={})",
            self.name,
            self.unread_count,
            self.media_count,
            self.downloaded_count,
            self.success_rate(),
            self.error_count()
        )
    }
}

/// Summary of one complete archiver run.
///
/// Well-defined even when channel enumeration itself fails: totals are zero
/// and the failure appears in `errors`. Whether a run finished normally or was
/// cut short by fail-fast is visible only through `errors` and the channel
/// list, not through a separate status field.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadSession {
    /// Number of channels attempted, including ones that failed outright.
    pub total_channels: usize,
    pub total_unread: usize,
    pub total_media: usize,
    pub total_downloaded: usize,
    /// One entry per attempted channel, in enumeration order.
    pub channel_stats: Vec<ChannelStats>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Failures above the per-channel level, e.g. enumeration errors.
    pub errors: Vec<String>,
}

impl DownloadSession {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Aggregate downloaded share of eligible media, vacuously 100% when no
    /// media was eligible anywhere.
    pub fn success_rate(&self) -> f64 {
        if self.total_media == 0 {
            return 100.0;
        }
        self.total_downloaded as f64 / self.total_media as f64 * 100.0
    }

    pub fn channels_with_downloads(&self) -> Vec<&ChannelStats> {
        self.channel_stats
            .iter()
            .filter(|s| s.downloaded_count > 0)
            .collect()
    }

    pub fn channels_with_errors(&self) -> Vec<&ChannelStats> {
        self.channel_stats.iter().filter(|s| s.has_errors()).collect()
    }

    /// Session-level errors plus every per-channel error.
    pub fn total_errors(&self) -> usize {
        self.errors.len()
            + self
                .channel_stats
                .iter()
                .map(ChannelStats::error_count)
                .sum::<usize>()
    }

    /// Mean downloads across channels that downloaded at least one file.
    pub fn average_files_per_channel(&self) -> f64 {
        let active = self
            .channel_stats
            .iter()
            .filter(|s| s.downloaded_count > 0)
            .count();
        if active == 0 {
            return 0.0;
        }
        self.total_downloaded as f64 / active as f64
    }
}

impl fmt::Display for DownloadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DownloadSession(duration={}s, channels={}, downloaded={}, success_rate={:.1}%)",
            self.duration().num_seconds(),
            self.total_channels,
            self.total_downloaded,
            self.success_rate()
        )
    }
}

/// One successfully resolved media item: either freshly transferred or found
/// already present on disk. Never retained by the orchestrator; it is returned
/// to the fetch caller and dropped with it.
#[derive(Debug, Clone, Serialize)]
pub struct MediaRecord {
    pub message_id: i64,
    pub channel_name: String,
    pub filename: String,
    pub path: PathBuf,
    pub date: DateTime<Utc>,
    pub text: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

impl MediaRecord {
    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Size currently on disk, regardless of what was recorded at download
    /// time.
    pub fn actual_file_size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

impl fmt::Display for MediaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MediaRecord(message_id={}, channel='{}', filename='{}', date={})",
            self.message_id,
            self.channel_name,
            self.filename,
            self.date.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(unread: usize, media: usize, downloaded: usize, errors: usize) -> ChannelStats {
        let mut s = ChannelStats::new("chan");
        s.unread_count = unread;
        s.media_count = media;
        s.downloaded_count = downloaded;
        for i in 0..errors {
            s.add_error(format!("error {i}"));
        }
        s
    }

    fn session(channels: Vec<ChannelStats>, errors: Vec<String>) -> DownloadSession {
        let start = Utc::now();
        DownloadSession {
            total_channels: channels.len(),
            total_unread: channels.iter().map(|c| c.unread_count).sum(),
            total_media: channels.iter().map(|c| c.media_count).sum(),
            total_downloaded: channels.iter().map(|c| c.downloaded_count).sum(),
            channel_stats: channels,
            start_time: start,
            end_time: start + Duration::seconds(5),
            errors,
        }
    }

    #[test]
    fn success_rate_is_vacuously_full_without_media() {
        let s = stats(3, 0, 0, 0);
        assert!((s.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn success_rate_reflects_downloads() {
        let s = stats(5, 4, 3, 1);
        assert!((s.success_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn has_errors_tracks_error_list() {
        let mut s = stats(1, 1, 0, 0);
        assert!(!s.has_errors());
        s.add_error("boom");
        assert!(s.has_errors());
        assert_eq!(s.error_count(), 1);
    }

    #[test]
    fn channel_stats_display_is_compact() {
        let s = stats(5, 3, 2, 1);
        let text = s.to_string();
        assert!(text.contains("unread=5"));
        assert!(text.contains("success_rate=66.7%"));
    }

    #[test]
    fn session_totals_and_subsets() {
        let sess = session(
            vec![stats(5, 3, 2, 1), stats(2, 0, 0, 0), stats(4, 4, 4, 0)],
            vec!["session broke".into()],
        );
        assert_eq!(sess.total_unread, 11);
        assert_eq!(sess.total_media, 7);
        assert_eq!(sess.total_downloaded, 6);
        assert_eq!(sess.channels_with_downloads().len(), 2);
        assert_eq!(sess.channels_with_errors().len(), 1);
        assert_eq!(sess.total_errors(), 2);
    }

    #[test]
    fn session_success_rate_vacuous_without_media() {
        let sess = session(vec![stats(2, 0, 0, 0)], Vec::new());
        assert!((sess.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_files_counts_only_active_channels() {
        let sess = session(vec![stats(5, 3, 3, 0), stats(5, 3, 1, 2), stats(1, 0, 0, 0)], Vec::new());
        assert!((sess.average_files_per_channel() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_files_is_zero_without_downloads() {
        let sess = session(vec![stats(1, 1, 0, 1)], Vec::new());
        assert!(sess.average_files_per_channel().abs() < f64::EPSILON);
    }

    #[test]
    fn duration_is_end_minus_start() {
        let sess = session(Vec::new(), Vec::new());
        assert_eq!(sess.duration().num_seconds(), 5);
    }
}
