// Excel workbook import (xlsx, xlsm, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::Timelike;

use pkgmatch_recon::{Workbook, Worksheet};

/// Load the named sheets that exist in the workbook, in `names` order.
///
/// Names the workbook doesn't have are left out; the caller decides whether
/// that is worth a warning.
pub fn load_sheets(path: &Path, names: &[String]) -> Result<Workbook, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;

    let available: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();

    for name in names {
        if !available.contains(name) {
            continue;
        }
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;
        let rows = range_rows(&range);
        log::info!("sheet {name}: {} rows loaded", rows.len());
        sheets.push(Worksheet {
            name: name.clone(),
            rows,
        });
    }

    Ok(Workbook { sheets })
}

/// Lay a calamine range out on absolute Excel coordinates.
///
/// Ranges start at the first used cell, so leading rows and columns are
/// padded with empty cells to keep `rows[0]` on Excel row 1.
fn range_rows(range: &Range<Data>) -> Vec<Vec<Option<String>>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<Option<String>>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![None; start_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    rows
}

/// Cell text as a spreadsheet user would read it; `None` for empty cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => (!s.is_empty()).then(|| s.clone()),
        Data::Float(n) => Some(format_number(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(format_datetime(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// `YYYY-MM-DD HH:MM:SS`, with microseconds only when present. Durations and
/// serials outside the calendar stay numeric.
fn format_datetime(dt: &ExcelDateTime) -> String {
    match dt.as_datetime() {
        Some(ndt) if !dt.is_duration() => {
            if ndt.nanosecond() == 0 {
                ndt.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                ndt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
            }
        }
        _ => format_number(dt.as_f64()),
    }
}

/// Integers without decimals: package ids are often stored as numbers.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
