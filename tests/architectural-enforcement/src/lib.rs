//! Architectural Enforcement Helpers
//!
//! Source scanning shared by the integration tests in `tests/`. The rules
//! themselves live next to the tests; this crate only knows how to find
//! workspace sources and report offending lines.
//!
//! The scan is textual: line comments are stripped, and everything from the
//! first `#[cfg(test)]` line of a file onward is treated as test code.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Every `.rs` file below `dir` (relative to the workspace root)
///
/// # Panics
///
/// Panics if `dir` does not exist, so a moved crate cannot make a rule pass
/// vacuously.
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    assert!(root.is_dir(), "{} does not exist", root.display());

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// A line that matched a forbidden pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Pattern that matched
    pub pattern: &'static str,
    /// Trimmed source line
    pub source: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} [{}] {}",
            self.path.display(),
            self.line,
            self.pattern,
            self.source
        )
    }
}

/// Non-test code lines of `content`, with line comments removed
pub fn production_lines(content: &str) -> impl Iterator<Item = (usize, &str, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line, line.split("//").next().unwrap_or(line)))
}

/// Find `patterns` in the production code of every file below `dir`
#[must_use]
pub fn scan(dir: &str, patterns: &[&'static str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, raw, code) in production_lines(&content) {
            for pattern in patterns {
                if code.contains(*pattern) {
                    violations.push(Violation {
                        path: path.clone(),
                        line,
                        pattern: *pattern,
                        source: raw.trim().to_string(),
                    });
                }
            }
        }
    }

    violations
}

/// Panic with a readable report when `violations` is non-empty
///
/// # Panics
///
/// Panics if any violation was found.
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s): {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content =
            "fn a() {}\n// std::thread::sleep\nlet x = 1; // sleep\n#[cfg(test)]\nfn b() {}\n";
        let lines: Vec<_> = production_lines(content).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].2, "");
        assert_eq!(lines[2].2, "let x = 1; ");
    }
}
