//! Binary image table parsing and end-address fixup
//!
//! The `Binary Images:` section lists every loaded binary with its address
//! range, build identifier and on-disk path:
//!
//! ```text
//! Binary Images:
//! 0x104e10000 - 0x104e17fff +App arm64 <aabbccdd-eeff-0011-2233-445566778899> /Applications/App.app/App
//! 0x19b2c4000 - ??? libsystem_c.dylib arm64e <00112233-4455-6677-8899-aabbccddeeff> /usr/lib/system/libsystem_c.dylib
//! ```
//!
//! Some reports print `???` for the upper bound; those are fixed afterwards
//! from the next image's start address so range matching can work.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::HashMap;

use crate::domain::{BinaryImage, BuildId, FailureReason, Failures, MAX_ADDRESS};
use crate::report::document::ReportLine;

/// Header line introducing the image table.
pub const IMAGE_TABLE_MARKER: &str = "Binary Images:";

lazy_static! {
    /// Table row: `0xSTART - 0xEND|??? [+]name <anything else>`.
    static ref IMAGE_ROW: Regex = Regex::new(
        r"^\s*0x(?P<start>[0-9a-fA-F]+)\s*-\s*(?:0x(?P<end>[0-9a-fA-F]+)|\?\?\?)\s+\+?(?P<name>\S+)(?:\s+(?P<rest>.*))?$"
    )
    .unwrap();
    /// Build identifier token within a row: `<AABBCCDD-...>` followed by the path.
    static ref BUILD_ID_TOKEN: Regex =
        Regex::new(r"<(?P<uuid>[0-9a-fA-F-]+)>\s*(?P<path>.*)$").unwrap();
}

/// Parsed image table with its two lookup indexes.
///
/// Lookups consult the display-name index first and the path-basename index
/// second; reports sometimes reference the on-disk executable name instead
/// of the logical bundle name.
#[derive(Debug, Default)]
pub struct ImageTable {
    images: Vec<BinaryImage>,
    by_name: HashMap<String, usize>,
    by_basename: HashMap<String, usize>,
}

impl ImageTable {
    fn insert(&mut self, image: BinaryImage) {
        let index = self.images.len();
        self.by_name.entry(image.name.clone()).or_insert(index);
        // secondary key only where the basename is not already taken
        self.by_basename.entry(image.path_basename().to_string()).or_insert(index);
        self.images.push(image);
    }

    /// Look up a binary as referenced by a report body line: display name
    /// first, then path basename.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&BinaryImage> {
        self.by_name
            .get(name)
            .or_else(|| self.by_basename.get(name))
            .map(|&index| &self.images[index])
    }

    /// First image containing `addr`, among images accepted by `eligible`,
    /// iterating in ascending start-address order.
    pub fn find_containing<F>(&self, addr: u64, eligible: F) -> Option<&BinaryImage>
    where
        F: Fn(&BinaryImage) -> bool,
    {
        let mut candidates: Vec<&BinaryImage> = self.images.iter().collect();
        candidates.sort_by_key(|image| image.start);
        candidates.into_iter().find(|image| image.contains(addr) && eligible(image))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinaryImage> + '_ {
        self.images.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Extract the binary image table from the report.
///
/// Scanning starts after the marker line and stops at the first line that
/// does not look like a table row. Rows without a parsable build identifier
/// can never resolve and are dropped with a failure record.
pub fn parse_image_table(lines: &[ReportLine], failures: &mut Failures) -> ImageTable {
    let mut table = ImageTable::default();

    let Some(marker) =
        lines.iter().position(|line| line.text.trim_start().starts_with(IMAGE_TABLE_MARKER))
    else {
        return table;
    };

    for line in &lines[marker + 1..] {
        let Some(caps) = IMAGE_ROW.captures(&line.text) else { break };
        let Ok(start) = u64::from_str_radix(&caps["start"], 16) else { break };
        let end = match caps.name("end") {
            Some(m) => match u64::from_str_radix(m.as_str(), 16) {
                Ok(end) => Some(end),
                Err(_) => break,
            },
            None => None,
        };
        let name = &caps["name"];

        let parsed = caps
            .name("rest")
            .and_then(|rest| BUILD_ID_TOKEN.captures(rest.as_str()))
            .and_then(|token| {
                BuildId::parse(&token["uuid"])
                    .map(|id| (id, token["path"].trim().to_string()))
            });
        let Some((build_id, path)) = parsed else {
            debug!("image {name} has no parsable build identifier, dropped");
            failures.record(name, FailureReason::MissingBuildId);
            continue;
        };

        // `???` rows carry no usable name; the build id is unique by construction
        let display_name =
            if name == "???" { build_id.to_string() } else { name.to_string() };
        debug!("image {display_name} at 0x{start:x} <{build_id}>");
        table.insert(BinaryImage { name: display_name, start, end, build_id, path });
    }

    table
}

/// Fix every unresolved end address from the start address of the
/// next-higher image, or the sentinel for the highest-mapped image.
///
/// The start list is sorted once up front so every fix works from the
/// original entries.
pub fn resolve_end_addresses(table: &mut ImageTable) {
    let mut starts: Vec<u64> = table.images.iter().map(|image| image.start).collect();
    starts.sort_unstable();

    for image in &mut table.images {
        if image.end.is_none() {
            let next = starts.iter().find(|&&start| start > image.start).copied();
            let end = next.unwrap_or(MAX_ADDRESS);
            debug!("fixed end address of {} to 0x{end:x}", image.name);
            image.end = Some(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::report::document::CrashReport;

    const UUID_A: &str = "aabbccdd-eeff-0011-2233-445566778899";
    const UUID_B: &str = "00112233-4455-6677-8899-aabbccddeeff";

    fn parse(text: &str) -> (ImageTable, Failures) {
        let report = CrashReport::from_text(Path::new("test.crash"), text);
        let mut failures = Failures::default();
        let table = parse_image_table(&report.lines, &mut failures);
        (table, failures)
    }

    #[test]
    fn test_parses_well_formed_rows() {
        let text = format!(
            "Process: App\n\nBinary Images:\n\
             0x1000 - 0x1fff +App arm64 <{UUID_A}> /Applications/App.app/App\n\
             0x8000 - 0x8fff libc.dylib arm64e <{UUID_B}> /usr/lib/libc.dylib\n"
        );
        let (table, failures) = parse(&text);
        assert_eq!(table.len(), 2);
        assert!(failures.is_empty());

        let app = table.lookup("App").unwrap();
        assert_eq!(app.start, 0x1000);
        assert_eq!(app.end, Some(0x1fff));
        assert_eq!(app.build_id.as_str(), "AABBCCDDEEFF00112233445566778899");
        assert_eq!(app.path, "/Applications/App.app/App");
    }

    #[test]
    fn test_scan_stops_at_first_non_row() {
        let text = format!(
            "Binary Images:\n\
             0x1000 - 0x1fff App arm64 <{UUID_A}> /bin/App\n\
             EOF\n\
             0x8000 - 0x8fff libc.dylib arm64e <{UUID_B}> /usr/lib/libc.dylib\n"
        );
        let (table, _) = parse(&text);
        assert_eq!(table.len(), 1);
        assert!(table.lookup("libc.dylib").is_none());
    }

    #[test]
    fn test_missing_build_id_dropped_with_failure() {
        let text = "Binary Images:\n\
                    0x1000 - 0x1fff App arm64 (no identifier) /bin/App\n";
        let (table, failures) = parse(text);
        assert!(table.is_empty());
        assert!(failures.contains("App"));
        let (_, reason) = failures.iter().next().unwrap();
        assert_eq!(*reason, FailureReason::MissingBuildId);
    }

    #[test]
    fn test_placeholder_name_uses_build_id() {
        let text = format!("Binary Images:\n0x1000 - 0x1fff ??? <{UUID_A}> /bin/mystery\n");
        let (table, _) = parse(&text);
        let image = table.lookup("AABBCCDDEEFF00112233445566778899").unwrap();
        assert_eq!(image.path, "/bin/mystery");
    }

    #[test]
    fn test_basename_fallback_lookup() {
        let text = format!(
            "Binary Images:\n0x1000 - 0x1fff MyApp arm64 <{UUID_A}> /Applications/MyApp.app/Contents/MacOS/BinaryName\n"
        );
        let (table, _) = parse(&text);
        assert!(table.lookup("MyApp").is_some());
        assert_eq!(table.lookup("BinaryName").unwrap().name, "MyApp");
        assert!(table.lookup("other").is_none());
    }

    #[test]
    fn test_unknown_end_becomes_next_start() {
        let text = format!(
            "Binary Images:\n\
             0x1000 - ??? App arm64 <{UUID_A}> /bin/App\n\
             0x5000 - 0x5fff libc.dylib arm64e <{UUID_B}> /usr/lib/libc.dylib\n"
        );
        let (mut table, _) = parse(&text);
        resolve_end_addresses(&mut table);
        assert_eq!(table.lookup("App").unwrap().end, Some(0x5000));
    }

    #[test]
    fn test_highest_unknown_end_becomes_sentinel() {
        let text = format!(
            "Binary Images:\n\
             0x1000 - 0x1fff App arm64 <{UUID_A}> /bin/App\n\
             0x5000 - ??? libc.dylib arm64e <{UUID_B}> /usr/lib/libc.dylib\n"
        );
        let (mut table, _) = parse(&text);
        resolve_end_addresses(&mut table);
        assert_eq!(table.lookup("libc.dylib").unwrap().end, Some(MAX_ADDRESS));
    }

    #[test]
    fn test_find_containing_respects_eligibility() {
        let text = format!(
            "Binary Images:\n\
             0x1000 - 0x2000 App arm64 <{UUID_A}> /bin/App\n\
             0x2000 - 0x3000 libc.dylib arm64e <{UUID_B}> /usr/lib/libc.dylib\n"
        );
        let (table, _) = parse(&text);
        let hit = table.find_containing(0x1500, |_| true).unwrap();
        assert_eq!(hit.name, "App");
        assert!(table.find_containing(0x1500, |image| image.name != "App").is_none());
        let hit = table.find_containing(0x2000, |_| true).unwrap();
        assert_eq!(hit.name, "libc.dylib");
        assert!(table.find_containing(0x3000, |_| true).is_none());
    }

    #[test]
    fn test_no_marker_yields_empty_table() {
        let (table, failures) = parse("Process: App\n0 App 0x1500 something\n");
        assert!(table.is_empty());
        assert!(failures.is_empty());
    }
}
