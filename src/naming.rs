//! Output file naming.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest sanitised component, in characters.
pub const MAX_COMPONENT_CHARS: usize = 80;

const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make `text` safe to use as one component of a file name.
///
/// Whitespace runs collapse to one space and the ends are trimmed, the
/// characters `\ / : * ? " < > |` are removed, the remaining spaces become
/// underscores, and the result is cut to [`MAX_COMPONENT_CHARS`] characters.
/// An empty result becomes `"Unknown"`.
///
/// ```rust
/// use jobsnap::naming::sanitize_for_filename;
///
/// assert_eq!(sanitize_for_filename("  Senior   Engineer "), "Senior_Engineer");
/// assert_eq!(sanitize_for_filename("???"), "Unknown");
/// ```
pub fn sanitize_for_filename(text: &str) -> String {
    let collapsed = RE_WHITESPACE.replace_all(text, " ");
    let cleaned: String = collapsed
        .trim()
        .chars()
        .filter(|c| !FORBIDDEN.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(MAX_COMPONENT_CHARS)
        .collect();
    if cleaned.is_empty() {
        "Unknown".to_string()
    } else {
        cleaned
    }
}

/// `{YYYY-MM-DD}-{company}-{title}.pdf`, both names sanitised.
pub fn document_filename(date: NaiveDate, company: &str, title: &str) -> String {
    format!(
        "{}-{}-{}.pdf",
        date.format("%Y-%m-%d"),
        sanitize_for_filename(company),
        sanitize_for_filename(title)
    )
}
