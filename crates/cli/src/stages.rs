//! Stage runners: read the stage's input files, run the engine, write its outputs.
//!
//! Nothing here prints; callers report the returned summaries.

use std::path::{Path, PathBuf};

use serde::Serialize;

use pkgmatch_io::csv::{read_table, write_records, write_rows};
use pkgmatch_io::xlsx::load_sheets;
use pkgmatch_recon::config::{AlmaConfig, EdsConfig};
use pkgmatch_recon::model::{DedupSummary, ExtractSummary, MatchSummary};
use pkgmatch_recon::{
    dedup_packages, extract_packages, match_packages, AlmaPackage, EdsPackage, MatchRecord,
    ReconError,
};

pub const ALMA_PACKAGES_CSV: &str = "alma_packages.csv";
pub const EDS_PACKAGES_CSV: &str = "eds_packages_unique.csv";
pub const MATCHES_EXACT_CSV: &str = "matches_exact.csv";
pub const EDS_UNMATCHED_CSV: &str = "eds_unmatched.csv";
pub const ALMA_UNMATCHED_CSV: &str = "alma_unmatched.csv";

/// Workbook → Alma package CSV.
///
/// The output file is only created once every present sheet passed its
/// header check.
pub fn run_extract(
    workbook: &Path,
    output: &Path,
    config: &AlmaConfig,
) -> Result<ExtractSummary, ReconError> {
    let book = load_sheets(workbook, &config.sheets).map_err(ReconError::Io)?;
    let extraction = extract_packages(&book, config)?;
    write_records(output, &AlmaPackage::HEADERS, &extraction.packages).map_err(ReconError::Io)?;
    Ok(extraction.summary)
}

/// EDS title export → unique package CSV with title counts.
pub fn run_dedup(input: &Path, output: &Path, config: &EdsConfig) -> Result<DedupSummary, ReconError> {
    let table = read_table(input).map_err(ReconError::Io)?;
    let dedup = dedup_packages(&table, config)?;
    write_records(output, &EdsPackage::HEADERS, &dedup.packages).map_err(ReconError::Io)?;
    Ok(dedup.summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPaths {
    pub exact: PathBuf,
    pub eds_unmatched: PathBuf,
    pub alma_unmatched: PathBuf,
}

impl MatchPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            exact: dir.join(MATCHES_EXACT_CSV),
            eds_unmatched: dir.join(EDS_UNMATCHED_CSV),
            alma_unmatched: dir.join(ALMA_UNMATCHED_CSV),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    #[serde(flatten)]
    pub summary: MatchSummary,
    pub files: MatchPaths,
}

/// EDS + Alma package CSVs → the three match files in `out_dir`.
///
/// A file is only written when its set is non-empty; unmatched files keep the
/// columns of the table the rows came from.
pub fn run_match(eds: &Path, alma: &Path, out_dir: &Path) -> Result<MatchReport, ReconError> {
    let eds_table = read_table(eds).map_err(ReconError::Io)?;
    let alma_table = read_table(alma).map_err(ReconError::Io)?;
    let output = match_packages(&eds_table, &alma_table)?;

    create_out_dir(out_dir)?;
    let files = MatchPaths::in_dir(out_dir);

    if !output.matches.is_empty() {
        write_records(&files.exact, &MatchRecord::HEADERS, &output.matches)
            .map_err(ReconError::Io)?;
    }
    if !output.eds_unmatched.is_empty() {
        write_rows(&files.eds_unmatched, &eds_table.headers, &output.eds_unmatched)
            .map_err(ReconError::Io)?;
    }
    if !output.alma_unmatched.is_empty() {
        write_rows(&files.alma_unmatched, &alma_table.headers, &output.alma_unmatched)
            .map_err(ReconError::Io)?;
    }

    Ok(MatchReport {
        summary: output.summary(),
        files,
    })
}

pub fn create_out_dir(dir: &Path) -> Result<(), ReconError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ReconError::Io(format!("cannot create {}: {e}", dir.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const EDS_EXPORT: &str = "\
Title,PackageID,PackageName,VendorName,PackageType,PackageAccess,ResourceType
Journal A,55,ACM Digital & Library,ACM,Complete,Subscribed,Journal
Journal B,55,ACM Digital & Library,ACM,Complete,Subscribed,Journal
Book C,55,ACM Digital & Library,ACM,Complete,Subscribed,Book
Free D,0,Publisher's Site,,,,Journal
";

    const ALMA_CSV: &str = "\
SheetName,ExcelRow,Alma_PACKAGE_ID,Alma_PACKAGE_NAME,Alma_PACKAGE_NAME_norm,SERVICE_TYPE
DATABASE,2,9001,ACM Digital Library,acm digital and library,Full
DATABASE,3,9002,Gale OneFile,gale onefile,Full
";

    #[test]
    fn dedup_then_match_end_to_end() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export.csv");
        let eds = dir.path().join(EDS_PACKAGES_CSV);
        let alma = dir.path().join(ALMA_PACKAGES_CSV);
        fs::write(&export, EDS_EXPORT).unwrap();
        fs::write(&alma, ALMA_CSV).unwrap();

        let dedup = run_dedup(&export, &eds, &EdsConfig::default()).unwrap();
        assert_eq!(dedup.unique_packages, 1);
        assert_eq!(dedup.rows_skipped, 1);

        let text = fs::read_to_string(&eds).unwrap();
        assert_eq!(
            text,
            "EDS_PackageID,EDS_PackageName,EDS_PackageName_norm,VendorName,PackageType,PackageAccess,AnyResourceType,TitleCount\n\
             55,ACM Digital & Library,acm digital and library,ACM,Complete,Subscribed,Journal,3\n"
        );

        let out = dir.path().join("out");
        let report = run_match(&eds, &alma, &out).unwrap();
        assert_eq!(report.summary.exact_matches, 1);
        assert_eq!(report.summary.eds_unmatched, 0);
        assert_eq!(report.summary.alma_unmatched, 1);

        assert!(report.files.exact.exists());
        assert!(!report.files.eds_unmatched.exists(), "empty set writes no file");
        let alma_left = fs::read_to_string(&report.files.alma_unmatched).unwrap();
        assert_eq!(
            alma_left,
            "SheetName,ExcelRow,Alma_PACKAGE_ID,Alma_PACKAGE_NAME,Alma_PACKAGE_NAME_norm,SERVICE_TYPE\n\
             DATABASE,3,9002,Gale OneFile,gale onefile,Full\n"
        );
    }

    #[test]
    fn dedup_schema_error_writes_nothing() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export.csv");
        let out = dir.path().join("eds.csv");
        fs::write(&export, "PackageID,PackageName\n1,A\n").unwrap();

        let err = run_dedup(&export, &out, &EdsConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumns { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn extract_writes_fixed_header_and_rows() {
        let dir = tempdir().unwrap();
        let book = dir.path().join("form.xlsx");
        let out = dir.path().join(ALMA_PACKAGES_CSV);

        let mut wb = rust_xlsxwriter::Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("SELECTIVE_PKG").unwrap();
        ws.write_string(0, 0, "PACKAGE_NAME").unwrap();
        ws.write_string(0, 1, "PACKAGE_ID").unwrap();
        ws.write_string(0, 2, "SERVICE_TYPE").unwrap();
        ws.write_string(1, 0, "Science & Nature").unwrap();
        ws.write_number(1, 1, 612.0).unwrap();
        ws.write_string(1, 2, "Selective").unwrap();
        wb.save(&book).unwrap();

        let summary = run_extract(&book, &out, &AlmaConfig::default()).unwrap();
        assert_eq!(summary.total_rows, 1);
        assert_eq!(summary.missing_sheets, vec!["LICENSED_AGG", "DATABASE"]);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "SheetName,ExcelRow,Alma_PACKAGE_ID,Alma_PACKAGE_NAME,Alma_PACKAGE_NAME_norm,SERVICE_TYPE\n\
             SELECTIVE_PKG,2,612,Science & Nature,science and nature,Selective\n"
        );
    }

    #[test]
    fn extract_schema_error_writes_nothing() {
        let dir = tempdir().unwrap();
        let book = dir.path().join("form.xlsx");
        let out = dir.path().join(ALMA_PACKAGES_CSV);

        let mut wb = rust_xlsxwriter::Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("LICENSED_AGG").unwrap();
        ws.write_string(0, 0, "PACKAGE_ID").unwrap();
        ws.write_string(0, 1, "PACKAGE_NAME").unwrap();
        ws.write_string(0, 2, "SERVICE_TYPE").unwrap();
        ws.write_string(1, 0, "1").unwrap();
        let ws = wb.add_worksheet();
        ws.set_name("DATABASE").unwrap();
        ws.write_string(0, 0, "PACKAGE_ID").unwrap();
        wb.save(&book).unwrap();

        let err = run_extract(&book, &out, &AlmaConfig::default()).unwrap_err();
        assert!(err.to_string().contains("sheet 'DATABASE'"), "{err}");
        assert!(!out.exists());
    }

    #[test]
    fn match_creates_missing_out_dir() {
        let dir = tempdir().unwrap();
        let eds = dir.path().join("eds.csv");
        let alma = dir.path().join("alma.csv");
        fs::write(&eds, "EDS_PackageID,EDS_PackageName_norm\n1,jstor\n").unwrap();
        fs::write(&alma, "Alma_PACKAGE_NAME_norm\nmuse\n").unwrap();

        let out = dir.path().join("nested").join("reports");
        let report = run_match(&eds, &alma, &out).unwrap();
        assert_eq!(report.summary.exact_matches, 0);
        assert!(!report.files.exact.exists());
        assert!(report.files.eds_unmatched.exists());
        assert!(report.files.alma_unmatched.exists());
    }
}
