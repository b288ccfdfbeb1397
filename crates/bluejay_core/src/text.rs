//! Text helpers.

/// Truncate `text` to at most `max` characters, respecting char boundaries.
///
/// # Examples
///
/// ```
/// use bluejay_core::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("hi", 300), "hi");
/// ```
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
