//! EDS deduplication: fold a title-level export into one row per package.

use std::collections::HashMap;

use crate::config::EdsConfig;
use crate::error::ReconError;
use crate::model::{field, DedupSummary, EdsPackage, PackageKey, Table, EDS_REQUIRED};
use crate::normalize::normalize;
use crate::schema::{require_columns, Duplicates};

/// Unique packages in first-seen order, each carrying its title count.
#[derive(Debug, Default)]
pub struct Dedup {
    pub packages: Vec<EdsPackage>,
    pub summary: DedupSummary,
}

/// Group title rows by [`PackageKey`] and count them.
///
/// The first row seen for a key supplies every descriptive field, including
/// `AnyResourceType`; later rows only advance the count. Rows whose package
/// id is empty or configured as a skip id never reach a group.
pub fn dedup_packages(table: &Table, config: &EdsConfig) -> Result<Dedup, ReconError> {
    let idx = require_columns(&table.source, &EDS_REQUIRED, &table.headers, Duplicates::Last)?;
    let [id_col, name_col, vendor_col, type_col, access_col, rtype_col] =
        [idx[0], idx[1], idx[2], idx[3], idx[4], idx[5]].map(Some);

    let mut packages: Vec<EdsPackage> = Vec::new();
    let mut by_key: HashMap<PackageKey, usize> = HashMap::new();
    let mut rows_skipped = 0;

    for row in &table.rows {
        let package_id = field(row, id_col).trim();
        if config.skips(package_id) {
            rows_skipped += 1;
            continue;
        }

        let package_name = field(row, name_col).trim();
        let candidate = EdsPackage {
            package_id: package_id.to_string(),
            package_name: package_name.to_string(),
            normalized_name: normalize(Some(package_name)),
            vendor: field(row, vendor_col).trim().to_string(),
            package_type: field(row, type_col).trim().to_string(),
            package_access: field(row, access_col).trim().to_string(),
            any_resource_type: field(row, rtype_col).trim().to_string(),
            title_count: 0,
        };

        let slot = *by_key.entry(candidate.key()).or_insert_with(|| {
            packages.push(candidate);
            packages.len() - 1
        });
        packages[slot].title_count += 1;
    }

    let summary = DedupSummary {
        rows_read: table.rows.len(),
        rows_skipped,
        unique_packages: packages.len(),
    };

    Ok(Dedup { packages, summary })
}
