//! # crashsym - Crash Report Symbolication
//!
//! crashsym rewrites raw memory addresses in a textual crash report into
//! human-readable symbol names (function, file, line). It correlates the
//! report's `Binary Images:` table with debug-symbol bundles found on disk,
//! then delegates the actual address-to-symbol translation to the external
//! resolver utility.
//!
//! ## Pipeline
//!
//! ```text
//! crash report ──▶ image table parser ──▶ end-address fixup
//!                                              │
//! symbol dirs  ──▶ bundle catalog (dwarfdump) ─┤
//!                                              ▼
//!                  unresolved-address extractor (two line formats)
//!                                              │
//!                                              ▼
//!                  batched resolver calls (atos) ──▶ splice ──▶ writer
//! ```
//!
//! Data flows strictly forward; every stage is synchronous. The two external
//! utilities sit behind the [`symbolication::SymbolTools`] trait so the whole
//! pipeline can be exercised in tests without spawning processes.
//!
//! ## Module Structure
//!
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: core types (build ids, binary images, failure records)
//! - [`report`]: crash report text handling (image table, body-line
//!   extraction, output writing)
//! - [`symbolication`]: debug-symbol bundle discovery and batched external
//!   resolution

pub mod cli;
pub mod domain;
pub mod report;
pub mod symbolication;
