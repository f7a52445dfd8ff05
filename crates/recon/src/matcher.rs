use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::model::{
    field, MatchOutput, MatchRecord, MatchType, Table, ALMA_NAME_NORM, EDS_NAME_NORM,
};
use crate::schema::{require_columns, Duplicates};

/// One-to-many join on normalized name.
///
/// Returns, for each EDS key, the positions of every Alma key equal to it
/// (empty when there is none). Alma positions are in input order.
pub fn join_by_name(eds_keys: &[&str], alma_keys: &[&str]) -> Vec<Vec<usize>> {
    let mut alma_by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (pos, key) in alma_keys.iter().enumerate() {
        alma_by_name.entry(*key).or_default().push(pos);
    }

    eds_keys
        .iter()
        .map(|key| alma_by_name.get(key).cloned().unwrap_or_default())
        .collect()
}

/// Match deduplicated EDS packages against Alma packages by normalized name.
///
/// EDS rows are keyed by name, first row wins; Alma rows are all kept, so one
/// EDS package can produce several matches. Rows with an empty key take no
/// part in matching and appear in no output set.
pub fn match_packages<'a>(eds: &'a Table, alma: &'a Table) -> Result<MatchOutput<'a>, ReconError> {
    let eds_norm = require_columns(&eds.source, &[EDS_NAME_NORM], &eds.headers, Duplicates::Last)?[0];
    let alma_norm = require_columns(&alma.source, &[ALMA_NAME_NORM], &alma.headers, Duplicates::Last)?[0];

    let eds_rows = first_row_per_key(eds, eds_norm);
    let alma_rows = keyed_rows(alma, alma_norm);
    log::info!(
        "matching {} EDS packages against {} Alma rows",
        eds_rows.len(),
        alma_rows.len()
    );

    let eds_keys: Vec<&str> = eds_rows.iter().map(|(k, _)| *k).collect();
    let alma_keys: Vec<&str> = alma_rows.iter().map(|(k, _)| *k).collect();
    let joined = join_by_name(&eds_keys, &alma_keys);

    let eds_cols = EdsColumns::resolve(eds);
    let alma_cols = AlmaColumns::resolve(alma);

    let mut matches = Vec::new();
    let mut eds_unmatched = Vec::new();
    for ((_, eds_row), positions) in eds_rows.iter().zip(&joined) {
        if positions.is_empty() {
            eds_unmatched.push(*eds_row);
            continue;
        }
        for &pos in positions {
            let (_, alma_row) = alma_rows[pos];
            matches.push(MatchRecord {
                match_type: MatchType::ExactName,
                eds_package_name: field(eds_row, eds_cols.package_name).to_string(),
                eds_package_id: field(eds_row, eds_cols.package_id).to_string(),
                vendor: field(eds_row, eds_cols.vendor).to_string(),
                alma_package_name: field(alma_row, alma_cols.package_name).to_string(),
                alma_package_id: field(alma_row, alma_cols.package_id).to_string(),
                sheet_name: field(alma_row, alma_cols.sheet_name).to_string(),
                excel_row: field(alma_row, alma_cols.excel_row).to_string(),
                service_type: field(alma_row, alma_cols.service_type).to_string(),
                title_count: field(eds_row, eds_cols.title_count).to_string(),
            });
        }
    }

    let matched_keys: HashSet<&str> = eds_keys.iter().copied().collect();
    let alma_unmatched = alma_rows
        .iter()
        .filter(|(key, _)| !matched_keys.contains(key))
        .map(|(_, row)| *row)
        .collect();

    Ok(MatchOutput {
        matches,
        eds_unmatched,
        alma_unmatched,
    })
}

/// Trimmed join key of every row, dropping empty keys.
fn keyed_rows(table: &Table, key_col: usize) -> Vec<(&str, &[String])> {
    let mut empty = 0;
    let rows: Vec<_> = table
        .rows
        .iter()
        .filter_map(|row| {
            let key = field(row, Some(key_col)).trim();
            if key.is_empty() {
                empty += 1;
                None
            } else {
                Some((key, row.as_slice()))
            }
        })
        .collect();
    if empty > 0 {
        log::debug!("{}: {empty} rows with empty normalized name excluded", table.source);
    }
    rows
}

fn first_row_per_key(table: &Table, key_col: usize) -> Vec<(&str, &[String])> {
    let mut seen = HashSet::new();
    let mut dropped = 0;
    let rows: Vec<_> = keyed_rows(table, key_col)
        .into_iter()
        .filter(|(key, _)| {
            let first = seen.insert(*key);
            if !first {
                dropped += 1;
            }
            first
        })
        .collect();
    if dropped > 0 {
        log::debug!(
            "{}: {dropped} rows dropped for repeating an earlier normalized name",
            table.source
        );
    }
    rows
}

struct EdsColumns {
    package_name: Option<usize>,
    package_id: Option<usize>,
    vendor: Option<usize>,
    title_count: Option<usize>,
}

impl EdsColumns {
    fn resolve(t: &Table) -> Self {
        Self {
            package_name: t.column("EDS_PackageName"),
            package_id: t.column("EDS_PackageID"),
            vendor: t.column("VendorName"),
            title_count: t.column("TitleCount"),
        }
    }
}

struct AlmaColumns {
    package_name: Option<usize>,
    package_id: Option<usize>,
    sheet_name: Option<usize>,
    excel_row: Option<usize>,
    service_type: Option<usize>,
}

impl AlmaColumns {
    fn resolve(t: &Table) -> Self {
        Self {
            package_name: t.column("Alma_PACKAGE_NAME"),
            package_id: t.column("Alma_PACKAGE_ID"),
            sheet_name: t.column("SheetName"),
            excel_row: t.column("ExcelRow"),
            service_type: t.column("SERVICE_TYPE"),
        }
    }
}
