use std::sync::OnceLock;

use regex::Regex;

fn percent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3})\s*%").unwrap())
}

/// Returns the first percentage found in a line of tool output.
///
/// Only the digits are returned, as written by the tool, so `"007%"` yields
/// `"007"`.
pub fn parse_progress(line: &str) -> Option<&str> {
    percent_regex()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Formats the marker printed after a line that carries a percentage.
pub fn progress_marker(percent: &str) -> String {
    format!("[Progress] {percent}%")
}
