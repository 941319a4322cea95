//! Shared helpers for html-parse integration tests, benches and fuzzing.
//!
//! Deliberately independent of `html-parse` itself: everything here works on
//! strings, byte slices and snapshot lines.

pub mod chunking;
pub mod golden;

use std::fmt::Write;

/// Render the first mismatch between two line lists with a little context.
///
/// Returns `None` when the lists are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> Option<String> {
    const CONTEXT: usize = 2;
    const MISSING: &str = "<missing>";

    fn line(lines: &[String], i: usize) -> &str {
        lines.get(i).map(String::as_str).unwrap_or(MISSING)
    }

    let longest = expected.len().max(actual.len());
    let first = (0..longest).find(|&i| line(expected, i) != line(actual, i))?;

    let mut out = String::new();
    let start = first.saturating_sub(CONTEXT);
    let end = (first + CONTEXT + 1).min(longest);
    let _ = writeln!(out, "first mismatch at line {}:", first + 1);
    for i in start..end {
        let marker = if i == first { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>4}  expected: {}", i + 1, line(expected, i));
        let _ = writeln!(out, "{marker} {:>4}    actual: {}", i + 1, line(actual, i));
    }
    let _ = writeln!(
        out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    Some(out)
}

/// Panic with a readable diff when the line lists differ.
#[track_caller]
pub fn assert_lines_eq(context: &str, expected: &[String], actual: &[String]) {
    if let Some(diff) = diff_lines(expected, actual) {
        panic!("{context}\n{diff}");
    }
}

/// Read an integer knob from the environment, accepting decimal or `0x` hex.
pub fn env_u64(key: &str, default: u64) -> u64 {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => trimmed.parse::<u64>().ok(),
    };
    parsed.unwrap_or_else(|| panic!("unsupported {key} value '{raw}'; expected an integer"))
}

#[cfg(test)]
mod tests {
    use super::diff_lines;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn equal_lists_have_no_diff() {
        assert_eq!(diff_lines(&lines(&["a", "b"]), &lines(&["a", "b"])), None);
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let diff = diff_lines(&lines(&["a", "b", "c"]), &lines(&["a", "x"])).expect("diff");
        assert!(diff.starts_with("first mismatch at line 2:"));
        assert!(diff.contains(">    2  expected: b"));
        assert!(diff.contains(">    2    actual: x"));
        assert!(diff.contains("     3    actual: <missing>"));
        assert!(diff.ends_with("expected 3 lines, actual 2 lines\n"));
    }
}
