//! Helpful utilities for working with text.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("tag pattern should compile"));

/// Removes anything that looks like an HTML tag from `raw`.
///
/// A tag is the shortest run of characters between a `<` and the next `>`
/// on the same line. Tags are removed outright, not replaced with spaces,
/// and HTML entities are left alone.
///
/// # Examples
///
/// ```
/// use garc::text::strip_tags;
/// let raw = "<p>Hello <a href=\"https://gab.com\">world</a></p>";
/// assert_eq!(strip_tags(raw), "Hello world");
/// ```
///
/// ```
/// use garc::text::strip_tags;
/// let raw = "1 &lt; 2";
/// assert_eq!(strip_tags(raw), raw);
/// ```
pub fn strip_tags(raw: &str) -> String {
    TAG.replace_all(raw, "").into_owned()
}
