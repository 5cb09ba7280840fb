//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "crashsym",
    version,
    about = "Resolve raw addresses in a crash report to symbol names",
    after_help = "\
EXAMPLES:
    crashsym report.crash                    Symbolicate against bundles in .
    crashsym -d ~/syms -d ./build report.crash
    crashsym -w report.crash                 Rewrite the report in place"
)]
pub struct Args {
    /// Crash report to symbolicate
    #[arg(value_name = "DOTCRASH_FILE")]
    pub crash_file: PathBuf,

    /// Directory to scan for debug symbol bundles (repeatable)
    #[arg(short = 'd', long = "symdirs", value_name = "DIR", default_value = ".")]
    pub symdirs: Vec<PathBuf>,

    /// Rewrite the crash report in place instead of printing to stdout
    #[arg(short = 'w', long = "rewrite")]
    pub rewrite: bool,

    /// Emit progress detail (image discovery, end-address fixups, batches)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symdirs_default() {
        let args = Args::parse_from(["crashsym", "report.crash"]);
        assert_eq!(args.symdirs, vec![PathBuf::from(".")]);
        assert!(!args.rewrite);
        assert!(!args.verbose);
    }

    #[test]
    fn test_symdirs_repeatable() {
        let args = Args::parse_from(["crashsym", "-d", "/a", "-d", "/b", "report.crash"]);
        assert_eq!(args.symdirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_rewrite_flag() {
        let args = Args::parse_from(["crashsym", "-w", "report.crash"]);
        assert!(args.rewrite);
        assert_eq!(args.crash_file, PathBuf::from("report.crash"));
    }
}
