//! Report text with exact line-terminator preservation
//!
//! The writer must reproduce the input byte-for-byte outside the spliced
//! needles, so each line keeps its own terminator (`\n`, `\r\n`, or none for
//! a terminator-less final line) instead of being normalized.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One report line: content without the terminator, plus the terminator.
#[derive(Debug, Clone)]
pub struct ReportLine {
    pub text: String,
    pub eol: &'static str,
}

/// A loaded crash report, mutated in place by the splicing stage.
#[derive(Debug)]
pub struct CrashReport {
    pub path: PathBuf,
    pub lines: Vec<ReportLine>,
}

impl CrashReport {
    /// Read a report from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read as text.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read crash report {}", path.display()))?;
        Ok(Self::from_text(path, &text))
    }

    #[must_use]
    pub fn from_text(path: &Path, text: &str) -> Self {
        Self { path: path.to_path_buf(), lines: split_lines(text) }
    }

    /// Reassemble the full report text, terminators included.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.text.len() + 2).sum());
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.eol);
        }
        out
    }
}

fn split_lines(text: &str) -> Vec<ReportLine> {
    text.split_inclusive('\n')
        .map(|chunk| {
            if let Some(stripped) = chunk.strip_suffix("\r\n") {
                ReportLine { text: stripped.to_string(), eol: "\r\n" }
            } else if let Some(stripped) = chunk.strip_suffix('\n') {
                ReportLine { text: stripped.to_string(), eol: "\n" }
            } else {
                ReportLine { text: chunk.to_string(), eol: "" }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(text: &str) -> CrashReport {
        CrashReport::from_text(Path::new("test.crash"), text)
    }

    #[test]
    fn test_round_trip_unix_terminators() {
        let text = "line one\nline two\n";
        assert_eq!(report(text).render(), text);
    }

    #[test]
    fn test_round_trip_mixed_terminators() {
        let text = "a\r\nb\nc";
        let rep = report(text);
        assert_eq!(rep.lines.len(), 3);
        assert_eq!(rep.lines[0].eol, "\r\n");
        assert_eq!(rep.lines[1].eol, "\n");
        assert_eq!(rep.lines[2].eol, "");
        assert_eq!(rep.render(), text);
    }

    #[test]
    fn test_content_excludes_terminator() {
        let rep = report("a\r\nb\n");
        assert_eq!(rep.lines[0].text, "a");
        assert_eq!(rep.lines[1].text, "b");
    }

    #[test]
    fn test_empty_report() {
        let rep = report("");
        assert!(rep.lines.is_empty());
        assert_eq!(rep.render(), "");
    }
}
