//! Shared helpers used across the pipeline.

/// Sanitize a channel name for use as a single path segment.
///
/// Keeps alphanumerics, hyphens and underscores; spaces and everything else
/// become underscores. Runs of underscores are collapsed, leading/trailing
/// underscores are stripped and the result is capped at `max_chars`
/// characters. An empty result falls back to `placeholder`.
///
/// Every place a channel name becomes part of a filesystem path must go
/// through this function with the same rules, otherwise the skip-if-present
/// check and the download directory can disagree about where a file lives.
pub fn sanitize_channel_name(name: &str, max_chars: usize, placeholder: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    let mut last_was_underscore = false;

    for ch in name.chars() {
        let mapped = if ch.is_alphanumeric() || ch == '-' {
            ch
        } else {
            // Spaces, underscores and all unsafe characters collapse to '_'.
            '_'
        };

        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        safe.push(mapped);
    }

    let trimmed: String = safe
        .trim_matches('_')
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end_matches('_')
        .to_string();

    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if
/// truncated. Safe on multi-byte UTF-8 input.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}
