//! # Verify Subcommand
//!
//! Checks a data directory the way the bulk loader would read it, without
//! touching a database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use bassin_store::flatfile::{self, Ledger};
use bassin_store::DataLayout;

/// Arguments for the `bassin verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory holding the boundary layers and the production ledger.
    #[arg(long, env = "BASSIN_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

/// Execute the verify subcommand.
///
/// Returns exit code: 0 when every file is present and every reference
/// resolves, 1 otherwise.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    verify_dir(&args.data_dir, &DataLayout::default())
}

fn verify_dir(data_dir: &Path, layout: &DataLayout) -> Result<u8> {
    let files = flatfile::verify_files(data_dir, layout);
    let mut missing = 0;
    for (path, exists) in &files {
        if *exists {
            println!("  OK       {}", path.display());
        } else {
            println!("  MISSING  {}", path.display());
            missing += 1;
        }
    }
    if missing > 0 {
        println!("{missing} of {} data files missing", files.len());
        return Ok(1);
    }

    let catalog = flatfile::load_catalog(data_dir, layout, Ledger::Required)
        .with_context(|| format!("failed to read {}", data_dir.display()))?;
    let report = catalog.integrity_report();

    println!(
        "{} regions, {} departments, {} communes, {} production rows",
        report.regions, report.departments, report.communes, report.records
    );
    for fault in &report.dangling {
        println!("  DANGLING {fault}");
    }
    for code in &report.orphan_record_regions {
        println!("  ORPHAN   production rows for unknown region {code}");
    }

    if report.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_reports_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let code = verify_dir(tmp.path(), &DataLayout::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn unreadable_layer_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::default();
        for path in layout.files(tmp.path()) {
            std::fs::write(path, "not a data file").unwrap();
        }
        assert!(verify_dir(tmp.path(), &layout).is_err());
    }
}
