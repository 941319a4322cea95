//! Golden fixture files.
//!
//! Each `*.toml` file holds a format tag and a list of cases:
//!
//! ```toml
//! format = "html-parse-golden-v1"
//!
//! [[case]]
//! name = "nested"
//! input = "<div><p>x</div>"
//! expected = ["#document", "  <div>", "    <p>", "      \"x\""]
//! diagnostics = ["MisnestedCloseTag"]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const GOLDEN_FORMAT_V1: &str = "html-parse-golden-v1";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GoldenFile {
    format: String,
    #[serde(rename = "case", default)]
    cases: Vec<GoldenCase>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GoldenCase {
    pub name: String,
    pub input: String,
    /// Render close styles in the snapshot.
    #[serde(default)]
    pub close_styles: bool,
    /// Parse with optional end-tag rules (default on).
    #[serde(default = "default_true")]
    pub optional_close: bool,
    pub expected: Vec<String>,
    /// Expected diagnostic codes, in order.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct GoldenFixture {
    pub path: PathBuf,
    pub case: GoldenCase,
}

impl GoldenFixture {
    pub fn label(&self) -> String {
        let file = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{file}::{}", self.case.name)
    }
}

/// Parse one fixture file's contents; `origin` is used in panic messages.
pub fn parse_golden(content: &str, origin: &Path) -> Vec<GoldenCase> {
    let file: GoldenFile = toml::from_str(content)
        .unwrap_or_else(|err| panic!("failed to parse golden fixture {origin:?}: {err}"));
    assert_eq!(
        file.format, GOLDEN_FORMAT_V1,
        "unsupported golden format in {origin:?}"
    );
    let mut names = std::collections::BTreeSet::new();
    for case in &file.cases {
        assert!(
            names.insert(case.name.as_str()),
            "duplicate case '{}' in {origin:?}",
            case.name
        );
        assert_eq!(
            case.expected.first().map(String::as_str),
            Some("#document"),
            "case '{}' in {origin:?} must start with #document",
            case.name
        );
    }
    file.cases
}

/// Load every `*.toml` fixture in `dir`, in file-name order.
pub fn load_golden_dir(dir: &Path) -> Vec<GoldenFixture> {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read fixture dir {dir:?}: {err}"));
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut fixtures = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read golden fixture {path:?}: {err}"));
        for case in parse_golden(&content, &path) {
            fixtures.push(GoldenFixture {
                path: path.clone(),
                case,
            });
        }
    }
    fixtures
}

#[cfg(test)]
mod tests {
    use super::parse_golden;
    use std::path::Path;

    #[test]
    fn parses_cases_with_defaults() {
        let content = r##"
format = "html-parse-golden-v1"

[[case]]
name = "one"
input = "<b>x</b>"
expected = ["#document", "  <b>", "    \"x\""]

[[case]]
name = "two"
input = "<p>"
optional_close = false
close_styles = true
expected = ["#document", "  <p> [auto]"]
"##;
        let cases = parse_golden(content, Path::new("inline.toml"));
        assert_eq!(cases.len(), 2);
        assert!(cases[0].optional_close);
        assert!(!cases[0].close_styles);
        assert!(cases[0].diagnostics.is_empty());
        assert!(!cases[1].optional_close);
        assert_eq!(cases[1].expected[1], "  <p> [auto]");
    }

    #[test]
    #[should_panic(expected = "unsupported golden format")]
    fn rejects_unknown_format() {
        parse_golden("format = \"v0\"\n", Path::new("bad.toml"));
    }
}
