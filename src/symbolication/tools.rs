//! External tool invocation
//!
//! Thin wrappers around the two subprocess collaborators. Their command
//! lines are load-bearing: argument names, order, and output shapes are
//! part of the contract with the platform toolchain.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Metadata-dump utility queried for build identifiers.
pub const METADATA_DUMP_TOOL: &str = "dwarfdump";
/// Address-to-symbol resolver.
pub const RESOLVER_TOOL: &str = "atos";

/// The two external collaborators behind one seam.
///
/// Production code uses [`SystemTools`]; tests substitute in-memory fakes.
pub trait SymbolTools {
    /// Dump build identifiers for a symbol bundle
    /// (`dwarfdump --uuid <bundle>`). Returns captured stdout.
    ///
    /// # Errors
    /// Spawn failure or non-zero exit.
    fn dump_build_ids(&self, bundle: &Path) -> Result<String>;

    /// Resolve one batch of addresses
    /// (`atos -l <load> -arch <arch> -o <symbols> <addr>...`).
    /// Returns captured stdout, one line per input address.
    ///
    /// # Errors
    /// Spawn failure or non-zero exit.
    fn resolve_addresses(
        &self,
        load_address: &str,
        architecture: &str,
        symbol_file: &Path,
        addresses: &[String],
    ) -> Result<String>;
}

/// Spawns the real utilities as blocking subprocesses, capturing stdout
/// fully before returning.
pub struct SystemTools;

impl SymbolTools for SystemTools {
    fn dump_build_ids(&self, bundle: &Path) -> Result<String> {
        run_captured(Command::new(METADATA_DUMP_TOOL).arg("--uuid").arg(bundle))
    }

    fn resolve_addresses(
        &self,
        load_address: &str,
        architecture: &str,
        symbol_file: &Path,
        addresses: &[String],
    ) -> Result<String> {
        let mut cmd = Command::new(RESOLVER_TOOL);
        cmd.arg("-l")
            .arg(load_address)
            .arg("-arch")
            .arg(architecture)
            .arg("-o")
            .arg(symbol_file)
            .args(addresses);
        run_captured(&mut cmd)
    }
}

fn run_captured(cmd: &mut Command) -> Result<String> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd.output().with_context(|| format!("failed to spawn {program}"))?;
    if !output.status.success() {
        bail!("{program} exited with {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
