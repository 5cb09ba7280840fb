//! Debug-symbol bundle discovery and batched external resolution
//!
//! Nothing in this crate reads a binary or parses DWARF; both halves of the
//! job are delegated to external utilities. The metadata-dump utility maps
//! bundles on disk to build identifiers, and the resolver utility turns
//! addresses into symbol text. Both sit behind the [`SymbolTools`] trait so
//! tests can run the pipeline without either installed.

pub mod catalog;
pub mod resolver;
pub mod tools;

pub use catalog::{DebugSymbolEntry, SymbolCatalog, BUNDLE_SUFFIX};
pub use resolver::{SymbolResolver, MAX_BATCH};
pub use tools::{SymbolTools, SystemTools, METADATA_DUMP_TOOL, RESOLVER_TOOL};
