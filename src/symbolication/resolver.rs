//! Batched symbol resolution and splice-back
//!
//! Addresses are resolved per owning binary, in bounded-size batches so a
//! single invocation never overruns the platform's argument-length ceiling.
//! The resolver contract is one output line per input address, in order;
//! each paired line replaces its needle in the report.

use log::{debug, warn};

use crate::domain::{AddressGroups, FailureReason, Failures, UnresolvedAddress};
use crate::report::document::CrashReport;
use crate::report::image_table::ImageTable;
use crate::symbolication::catalog::SymbolCatalog;
use crate::symbolication::tools::SymbolTools;

/// Upper bound on addresses per resolver invocation. 10,000 keeps the
/// command line comfortably under every supported platform's ceiling.
pub const MAX_BATCH: usize = 10_000;

/// Drives the external resolver over the queued address groups.
pub struct SymbolResolver<'a> {
    tools: &'a dyn SymbolTools,
    batch_size: usize,
}

impl<'a> SymbolResolver<'a> {
    #[must_use]
    pub fn new(tools: &'a dyn SymbolTools) -> Self {
        Self { tools, batch_size: MAX_BATCH }
    }

    /// Override the batch size. Tests use this to exercise batch
    /// boundaries; the CLI always runs with [`MAX_BATCH`].
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Resolve every queued address and splice results into the report.
    ///
    /// Returns true when at least one line actually changed. An invocation
    /// failure abandons the binary's remaining batches; a short read
    /// abandons only that batch's splicing.
    pub fn run(
        &self,
        report: &mut CrashReport,
        table: &ImageTable,
        catalog: &SymbolCatalog,
        groups: &AddressGroups,
        failures: &mut Failures,
    ) -> bool {
        let mut progressed = false;

        for (name, addresses) in groups.iter() {
            let Some(image) = table.lookup(name) else { continue };
            let Some(entry) = catalog.get(&image.build_id) else { continue };
            let load_address = format!("0x{:x}", image.start);

            for batch in addresses.chunks(self.batch_size) {
                let hex: Vec<String> =
                    batch.iter().map(|address| address.hex_address.clone()).collect();
                debug!("resolving {} addresses for {name} ({})", hex.len(), entry.architecture);

                let output = match self.tools.resolve_addresses(
                    &load_address,
                    &entry.architecture,
                    &entry.file_path,
                    &hex,
                ) {
                    Ok(output) => output,
                    Err(err) => {
                        warn!("resolver failed for {name}: {err:#}");
                        failures.record(name, FailureReason::ResolverFailed(format!("{err:#}")));
                        break;
                    }
                };

                let lines: Vec<&str> = output.lines().collect();
                if lines.len() < batch.len() {
                    warn!(
                        "resolver returned {} lines for {} addresses of {name}",
                        lines.len(),
                        batch.len()
                    );
                    failures.record(name, FailureReason::InsufficientOutput);
                    continue;
                }

                for (address, symbol) in batch.iter().zip(&lines) {
                    if splice(report, address, symbol.trim_end()) {
                        progressed = true;
                    }
                }
            }
        }

        progressed
    }
}

/// Replace the needle with resolver output in its line. A resolver that
/// echoes the needle back unchanged is not progress.
fn splice(report: &mut CrashReport, address: &UnresolvedAddress, symbol: &str) -> bool {
    if symbol == address.needle {
        return false;
    }
    let Some(line) = report.lines.get_mut(address.line_index) else {
        return false;
    };
    if !line.text.contains(&address.needle) {
        return false;
    }
    line.text = line.text.replacen(&address.needle, symbol, 1);
    true
}
