//! Report output and exit decision
//!
//! The run succeeds when something was resolved, or when there was nothing
//! to complain about in the first place. On success the (possibly modified)
//! report goes to stdout or back into the original file; on failure the body
//! is withheld. Failure diagnostics go to stderr either way.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};

use crate::domain::Failures;
use crate::report::document::CrashReport;

/// Where the resolved report goes.
#[derive(Debug, Clone, Copy)]
pub enum Output {
    Stdout,
    /// Rewrite the original file.
    InPlace,
}

/// Emit the report per the overall outcome and print failure diagnostics.
///
/// Returns true on overall success (exit 0), false when failures were
/// recorded and nothing resolved (exit 1).
///
/// # Errors
/// Returns an error if writing the report out fails.
pub fn write_report(
    report: &CrashReport,
    output: Output,
    progressed: bool,
    failures: &Failures,
) -> Result<bool> {
    let succeeded = progressed || failures.is_empty();

    if succeeded {
        let body = report.render();
        match output {
            Output::Stdout => {
                io::stdout()
                    .lock()
                    .write_all(body.as_bytes())
                    .context("failed to write report to stdout")?;
            }
            Output::InPlace => {
                fs::write(&report.path, body).with_context(|| {
                    format!("failed to rewrite crash report {}", report.path.display())
                })?;
            }
        }
    }

    for (name, reason) in failures.iter() {
        eprintln!("{name}: {reason}");
    }

    Ok(succeeded)
}
