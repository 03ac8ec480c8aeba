//! Lyrics windowing
//!
//! Stored lyrics are newline-separated verses. A window selects a range of
//! verses and joins them with a single space:
//!
//! "a\nb\nc\nd" with offset 1, limit 3 -> "b c"
//!
//! Note: `limit` is an END INDEX, not a verse count. Clients depend on this,
//! so it stays. `paginate_count` is the count-based alternative.

use super::models::LyricsWindow;

/// Window of verses `[offset, limit)`.
///
/// - `limit` missing, non-positive or past the end -> number of verses
/// - `offset` missing, negative or past the end -> 0
/// - `offset >= limit` -> empty text
pub fn paginate(text: &str, limit: Option<i64>, offset: Option<i64>) -> LyricsWindow {
    let verses: Vec<&str> = text.split('\n').collect();
    let n = verses.len();

    let end = limit
        .and_then(|l| usize::try_from(l).ok())
        .filter(|l| *l > 0 && *l <= n)
        .unwrap_or(n);
    let start = clamp_offset(offset, n);

    window(&verses, start, end)
}

/// Window of `count` verses starting at `offset`.
///
/// A missing or non-positive `count` takes every verse from `offset` on.
pub fn paginate_count(text: &str, offset: Option<i64>, count: Option<i64>) -> LyricsWindow {
    let verses: Vec<&str> = text.split('\n').collect();
    let n = verses.len();

    let start = clamp_offset(offset, n);
    let end = count
        .and_then(|c| usize::try_from(c).ok())
        .filter(|c| *c > 0)
        .map(|c| start.saturating_add(c).min(n))
        .unwrap_or(n);

    window(&verses, start, end)
}

fn clamp_offset(offset: Option<i64>, n: usize) -> usize {
    offset
        .and_then(|o| usize::try_from(o).ok())
        .filter(|o| *o <= n)
        .unwrap_or(0)
}

fn window(verses: &[&str], start: usize, end: usize) -> LyricsWindow {
    let text = if start >= end {
        String::new()
    } else {
        verses[start..end].join(" ")
    };
    LyricsWindow { text }
}
