//! Changelog section extraction.
//!
//! A changelog is treated as plain lines; the only structure this crate
//! understands is "some lines open a version section". Callers declare how
//! those lines look (one or more matchers covering the whole line), and the
//! extractor returns the text between the line mentioning the target version
//! and the next version line, with the common indentation removed.
//!
//! There is deliberately no markdown parsing here. A file like
//!
//! ```text
//! ## Version 2.0.1
//!   - Feature 1
//!     - Feature 1.a
//!   - Feature 2
//!
//! ## Version 2.0.0
//!   - ...
//! ```
//!
//! with the matcher `starts_with_matcher("## Version")` and target `2.0.1`
//! yields `- Feature 1\n  - Feature 1.a\n- Feature 2`.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// File name searched for when no explicit changelog path is configured.
pub const DEFAULT_FILE_NAME: &str = "CHANGELOG.md";

#[derive(Debug, Error)]
pub enum ChangelogError {
    /// No version-line matcher was configured; extraction cannot tell where
    /// sections begin.
    #[error("impossible to extract changelog: no indication was given on how to recognize version lines")]
    NoVersionLinePattern,

    /// No changelog file exists anywhere along the directory chain.
    #[error("no changelog found, expected {expected}")]
    NotFound { expected: Utf8PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Builds a matcher for version lines that start with the given literal text.
pub fn starts_with_matcher(prefix: &str) -> Regex {
    Regex::new(&format!("^{}.*", regex::escape(prefix))).expect("escaped literal is a valid regex")
}

/// Compiles `pattern` so that it must cover a whole line to count.
///
/// The pattern is wrapped as `^(?:pattern)$` before compilation. Without the
/// anchors, a match test would report the leftmost alternative only: `v1|v1.0`
/// against the line `v1.0` finds `v1` and never considers the full-line
/// alternative.
pub fn whole_line_matcher(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

/// Returns the first `CHANGELOG.md` found in the given directory chain.
///
/// The chain is usually a project directory followed by its parent project
/// directories, most specific first.
pub fn discover_file<I>(dirs: I) -> Option<Utf8PathBuf>
where
    I: IntoIterator<Item = Utf8PathBuf>,
{
    for dir in dirs {
        let candidate = dir.join(DEFAULT_FILE_NAME);
        if candidate.exists() {
            debug!("found changelog at {candidate}");
            return Some(candidate);
        }
    }
    None
}

/// Reads `path` and extracts the section for `version`.
pub fn read_section(
    path: &Utf8Path,
    version: &str,
    matchers: &[Regex],
) -> Result<String, ChangelogError> {
    let text = fs::read_to_string(path)?;
    extract_section(&text, version, matchers)
}

/// Extracts the changelog section for `version` from raw changelog text.
///
/// Scans top to bottom. A line matching any matcher opens or closes a
/// section: the line mentioning `version` opens the target section, the next
/// matching line closes it. Boundary lines are excluded from the result. If
/// the target version never appears, the result is the empty string; this is
/// a valid outcome, not an error.
pub fn extract_section(
    text: &str,
    version: &str,
    matchers: &[Regex],
) -> Result<String, ChangelogError> {
    if matchers.is_empty() {
        return Err(ChangelogError::NoVersionLinePattern);
    }

    let mut captured: Vec<&str> = Vec::new();
    let mut in_version = false;

    for line in text.lines() {
        if matchers.iter().any(|m| matches_whole_line(m, line)) {
            if in_version {
                break;
            }
            if line.contains(version) {
                in_version = true;
            }
            continue;
        }

        if in_version {
            captured.push(line);
        }
    }

    Ok(trim_indent(&captured))
}

/// A matcher accepts a line only when its match covers the whole line.
/// Matchers built by [`whole_line_matcher`] are anchored and always satisfy
/// this; the span check guards against unanchored patterns handed in
/// directly, which would otherwise count on a partial match.
fn matches_whole_line(matcher: &Regex, line: &str) -> bool {
    matcher
        .find(line)
        .is_some_and(|m| m.start() == 0 && m.end() == line.len())
}

/// Removes the common leading whitespace of the captured lines.
///
/// The width is computed over non-blank lines only. A blank first or last
/// line is dropped; blank interior lines are kept (as empty strings).
fn trim_indent(lines: &[&str]) -> String {
    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let last = lines.len().saturating_sub(1);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if (i == 0 || i == last) && line.trim().is_empty() {
            continue;
        }
        out.push(strip_chars(line, min_indent));
    }
    out.join("\n")
}

fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}
