//! Unresolved-address extraction
//!
//! Body lines come in two mutually exclusive shapes, tried in order:
//!
//! ```text
//! 3   MyApp                 0x0000000104e11a2c 0x104e10000 + 6700
//! 3   start_wqthread + 8 (in libsystem_pthread.dylib) [0x19b2c5f08]
//! ```
//!
//! The first names its binary outright; the second is matched by address
//! range. Misses in the first format are explained where possible (wrong
//! build identifier, no symbols shipped); misses in the second stay silent.
//! That asymmetry is deliberate and kept as-is.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::domain::{AddressGroups, BinaryImage, FailureReason, Failures, UnresolvedAddress};
use crate::report::document::CrashReport;
use crate::report::image_table::ImageTable;
use crate::symbolication::catalog::SymbolCatalog;

lazy_static! {
    /// Stack frame: `N  binary  0xADDR  rest-of-line`.
    static ref STACK_FRAME: Regex = Regex::new(
        r"^(?P<frame>\d+)\s+(?P<name>\S.*?)\s+(?P<addr>0x[0-9a-fA-F]+)\s+(?P<rest>\S.*)$"
    )
    .unwrap();
    /// Bracketed form: `N  text  [0xADDR]`.
    static ref BRACKET_FRAME: Regex = Regex::new(
        r"^(?P<frame>\d+)\s+(?P<text>\S.*?)\s+\[(?P<addr>0x[0-9a-fA-F]+)\]\s*$"
    )
    .unwrap();
}

/// Scan every body line for addresses that can and should be resolved.
///
/// Returns the per-binary address queues in first-seen order; inexplicable
/// misses are left untouched, explicable ones land in `failures`.
pub fn extract_unresolved(
    report: &CrashReport,
    table: &ImageTable,
    catalog: &SymbolCatalog,
    failures: &mut Failures,
) -> AddressGroups {
    let mut groups = AddressGroups::default();

    for (line_index, line) in report.lines.iter().enumerate() {
        if let Some(caps) = STACK_FRAME.captures(&line.text) {
            scan_stack_frame(&caps, line_index, table, catalog, failures, &mut groups);
        } else if let Some(caps) = BRACKET_FRAME.captures(&line.text) {
            scan_bracketed(&caps, line_index, table, catalog, &mut groups);
        }
    }

    groups
}

fn scan_stack_frame(
    caps: &regex::Captures<'_>,
    line_index: usize,
    table: &ImageTable,
    catalog: &SymbolCatalog,
    failures: &mut Failures,
    groups: &mut AddressGroups,
) {
    let name = &caps["name"];
    // one diagnostic per binary; later lines for a failed binary are skipped
    if failures.contains(name) {
        return;
    }

    let image = table.lookup(name);
    if let Some(image) = image {
        if catalog.contains(&image.build_id) {
            groups.push(
                &image.name,
                UnresolvedAddress {
                    hex_address: caps["addr"].to_string(),
                    line_index,
                    needle: caps["rest"].to_string(),
                },
            );
            return;
        }
    }

    // Explain the miss where possible. Symbols on disk under the same
    // executable name but a different build identifier are the common case
    // after a rebuild.
    let wanted: &str = image.map_or(name, BinaryImage::path_basename);
    if catalog.find_by_basename(wanted).is_some() {
        debug!("{name}: symbols found for basename {wanted} but identifiers differ");
        failures.record(name, FailureReason::BuildIdMismatch);
    } else if caps["rest"].starts_with(&format!("{name} + ")) {
        failures.record(name, FailureReason::NoSymbolsFound);
    }
}

fn scan_bracketed(
    caps: &regex::Captures<'_>,
    line_index: usize,
    table: &ImageTable,
    catalog: &SymbolCatalog,
    groups: &mut AddressGroups,
) {
    let hex = &caps["addr"];
    let Ok(addr) = u64::from_str_radix(hex.trim_start_matches("0x"), 16) else {
        return;
    };
    // membership is restricted to binaries we can actually resolve against;
    // anything else stays silent in this format
    if let Some(image) = table.find_containing(addr, |image| catalog.contains(&image.build_id)) {
        groups.push(
            &image.name,
            UnresolvedAddress {
                hex_address: hex.to_string(),
                line_index,
                needle: caps["text"].to_string(),
            },
        );
    }
}
