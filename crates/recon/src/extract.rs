//! Alma extraction: scan the activation workbook's package sheets into one table.

use crate::config::AlmaConfig;
use crate::error::ReconError;
use crate::model::{
    AlmaPackage, ExtractSummary, SheetSummary, Workbook, Worksheet, ALMA_PACKAGE_ID,
    ALMA_PACKAGE_NAME, ALMA_SERVICE_TYPE,
};
use crate::normalize::normalize;
use crate::schema::{require_columns, Duplicates};

/// Packages from every scanned sheet, in sheet order then row order.
#[derive(Debug, Default)]
pub struct Extraction {
    pub packages: Vec<AlmaPackage>,
    pub summary: ExtractSummary,
}

#[derive(Debug, Clone, Copy)]
struct SheetColumns {
    package_id: usize,
    package_name: usize,
    service_type: usize,
}

/// Extract package rows from the configured sheets.
///
/// Every present sheet's header is validated before any row is scanned, so a
/// schema error never leaves a partial table behind. Missing sheets are
/// skipped with a warning and listed in the summary.
pub fn extract_packages(workbook: &Workbook, config: &AlmaConfig) -> Result<Extraction, ReconError> {
    let mut summary = ExtractSummary::default();
    let mut planned: Vec<(&Worksheet, SheetColumns)> = Vec::new();

    for name in &config.sheets {
        let Some(sheet) = workbook.sheet(name) else {
            log::warn!("Sheet {name} not found in workbook; skipping");
            summary.missing_sheets.push(name.clone());
            continue;
        };
        planned.push((sheet, sheet_columns(sheet)?));
    }

    let mut packages = Vec::new();
    for (sheet, cols) in planned {
        let before = packages.len();
        scan_sheet(sheet, cols, config.blank_row_limit, &mut packages);
        summary.sheets.push(SheetSummary {
            sheet: sheet.name.clone(),
            rows_written: packages.len() - before,
        });
    }
    summary.total_rows = packages.len();

    Ok(Extraction { packages, summary })
}

fn sheet_columns(sheet: &Worksheet) -> Result<SheetColumns, ReconError> {
    let header: Vec<&str> = sheet
        .rows
        .first()
        .map(|row| row.iter().map(|c| c.as_deref().unwrap_or("")).collect())
        .unwrap_or_default();

    let idx = require_columns(
        &format!("sheet '{}'", sheet.name),
        &[ALMA_PACKAGE_ID, ALMA_PACKAGE_NAME, ALMA_SERVICE_TYPE],
        &header,
        Duplicates::First,
    )?;

    Ok(SheetColumns {
        package_id: idx[0],
        package_name: idx[1],
        service_type: idx[2],
    })
}

/// Non-empty text of cell `idx`, if any.
fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .filter(|s| !s.is_empty())
}

fn is_blank(row: &[Option<String>]) -> bool {
    (0..row.len()).all(|i| cell(row, i).is_none())
}

fn scan_sheet(
    sheet: &Worksheet,
    cols: SheetColumns,
    blank_row_limit: usize,
    out: &mut Vec<AlmaPackage>,
) {
    let mut empty_streak = 0;

    // rows[0] is the header; data starts at Excel row 2.
    for (offset, row) in sheet.rows.iter().enumerate().skip(1) {
        let excel_row = offset + 1;

        if is_blank(row) {
            empty_streak += 1;
            if empty_streak >= blank_row_limit {
                log::debug!(
                    "sheet {}: {empty_streak} blank rows ending at row {excel_row}; assuming end of data",
                    sheet.name
                );
                break;
            }
            continue;
        }
        empty_streak = 0;

        let package_id = cell(row, cols.package_id);
        let package_name = cell(row, cols.package_name);
        if package_id.is_none() && package_name.is_none() {
            continue;
        }

        out.push(AlmaPackage {
            sheet_name: sheet.name.clone(),
            excel_row,
            package_id: package_id.unwrap_or("").to_string(),
            package_name: package_name.unwrap_or("").to_string(),
            normalized_name: normalize(package_name),
            service_type: cell(row, cols.service_type).unwrap_or("").to_string(),
        });
    }
}
