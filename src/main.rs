//! # crashsym - Main Entry Point
//!
//! Orchestrates the pipeline: load the report, parse and fix the binary
//! image table, build the symbol catalog (fatal when empty), extract
//! unresolved addresses, resolve them in batches, write the result.
//!
//! Exit codes: 0 when something resolved or nothing failed, 1 otherwise
//! (including fatal errors); usage errors exit 2 via clap itself.

use anyhow::Result;
use clap::Parser;
use log::info;

use crashsym::cli::Args;
use crashsym::domain::Failures;
use crashsym::report::{
    extract_unresolved, parse_image_table, resolve_end_addresses, write_report, CrashReport,
    Output,
};
use crashsym::symbolication::{SymbolCatalog, SymbolResolver, SystemTools};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    std::process::exit(match run(&args) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_ERROR,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

/// Warnings only by default; `-v` turns on per-item detail. `RUST_LOG`
/// overrides both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: &Args) -> Result<bool> {
    let mut report = CrashReport::load(&args.crash_file)?;

    let mut failures = Failures::default();
    let mut table = parse_image_table(&report.lines, &mut failures);
    resolve_end_addresses(&mut table);
    info!("parsed {} binary images from {}", table.len(), args.crash_file.display());

    // Nothing to resolve against is fatal, and decided before any body scan.
    let tools = SystemTools;
    let catalog = SymbolCatalog::scan(&args.symdirs, &tools)?;

    let groups = extract_unresolved(&report, &table, &catalog, &mut failures);
    info!(
        "{} addresses across {} binaries need resolution",
        groups.total_addresses(),
        groups.len()
    );

    let progressed =
        SymbolResolver::new(&tools).run(&mut report, &table, &catalog, &groups, &mut failures);

    let output = if args.rewrite { Output::InPlace } else { Output::Stdout };
    write_report(&report, output, progressed, &failures)
}
