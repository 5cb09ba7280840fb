//! Debug symbol bundle discovery
//!
//! Scans the configured directories for `.dSYM` bundles and asks the
//! metadata-dump utility which build identifiers each one carries. Output
//! lines look like:
//!
//! ```text
//! UUID: AABBCCDD-EEFF-0011-2233-445566778899 (arm64) /syms/App.dSYM/Contents/Resources/DWARF/App
//! ```
//!
//! One bundle may carry several architecture slices; each becomes its own
//! entry. A bundle that cannot be dumped is skipped, not fatal. Ending the
//! scan with an empty catalog is fatal, since there is nothing to resolve
//! against.

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{BuildId, CatalogError};
use crate::symbolication::tools::SymbolTools;

/// Directory-name suffix identifying a debug-symbol bundle.
pub const BUNDLE_SUFFIX: &str = ".dSYM";

lazy_static! {
    /// `UUID: <hex-with-dashes> (<architecture>) <binaryPath>`
    static ref UUID_LINE: Regex =
        Regex::new(r"^UUID:\s*(?P<uuid>[0-9a-fA-F-]+)\s*\((?P<arch>[^)]+)\)\s+(?P<path>.+)$")
            .unwrap();
}

/// One (bundle, architecture) pair discovered on disk.
#[derive(Debug, Clone)]
pub struct DebugSymbolEntry {
    pub build_id: BuildId,
    /// Path handed to the resolver's `-o` argument (the DWARF file inside
    /// the bundle, as reported by the metadata dump).
    pub file_path: PathBuf,
    pub architecture: String,
}

/// Build-identifier-keyed index of every usable symbol entry found on disk.
#[derive(Debug, Default)]
pub struct SymbolCatalog {
    entries: HashMap<BuildId, DebugSymbolEntry>,
}

impl SymbolCatalog {
    /// Scan `dirs` for symbol bundles.
    ///
    /// Unreadable directories and undumpable bundles are logged and
    /// skipped; duplicate build identifiers overwrite (last bundle wins).
    ///
    /// # Errors
    /// [`CatalogError::NoBundles`] when no directory yielded a usable entry.
    pub fn scan(dirs: &[PathBuf], tools: &dyn SymbolTools) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for dir in dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("skipping symbol directory {}: {err}", dir.display());
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                    continue;
                };
                if !file_name.ends_with(BUNDLE_SUFFIX) {
                    continue;
                }
                match tools.dump_build_ids(&path) {
                    Ok(output) => catalog.ingest_dump(&path, &output),
                    Err(err) => warn!("skipping bundle {}: {err:#}", path.display()),
                }
            }
        }

        if catalog.entries.is_empty() {
            let searched =
                dirs.iter().map(|dir| dir.display().to_string()).collect::<Vec<_>>().join(" ");
            return Err(CatalogError::NoBundles { searched });
        }
        info!("catalog holds {} debug symbol entries", catalog.entries.len());
        Ok(catalog)
    }

    fn ingest_dump(&mut self, bundle: &Path, output: &str) {
        for line in output.lines() {
            let Some(caps) = UUID_LINE.captures(line) else { continue };
            let Some(build_id) = BuildId::parse(&caps["uuid"]) else {
                warn!("unparsable build identifier in {}: {}", bundle.display(), &caps["uuid"]);
                continue;
            };
            debug!("found {build_id} ({}) in {}", &caps["arch"], bundle.display());
            self.entries.insert(
                build_id.clone(),
                DebugSymbolEntry {
                    build_id,
                    file_path: PathBuf::from(&caps["path"]),
                    architecture: caps["arch"].trim().to_string(),
                },
            );
        }
    }

    #[must_use]
    pub fn get(&self, id: &BuildId) -> Option<&DebugSymbolEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &BuildId) -> bool {
        self.entries.contains_key(id)
    }

    /// Reverse lookup by the basename of the contained binary path, used to
    /// explain build-identifier mismatches.
    #[must_use]
    pub fn find_by_basename(&self, name: &str) -> Option<&DebugSymbolEntry> {
        self.entries
            .values()
            .find(|entry| entry.file_path.file_name().and_then(|n| n.to_str()) == Some(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Test-only direct insertion, bypassing the directory scan.
    #[cfg(test)]
    pub(crate) fn insert_entry(&mut self, entry: DebugSymbolEntry) {
        self.entries.insert(entry.build_id.clone(), entry);
    }
}
