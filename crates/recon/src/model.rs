use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A flat CSV export: header plus string rows.
///
/// `source` labels the table in error messages (usually the file path).
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }

    /// Index of the last header equal to `name`; a repeated CSV column
    /// overwrites the earlier ones when a row is read by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == name)
    }
}

/// Field `idx` of `row`, or empty when the record is short or the column is absent.
pub fn field(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// One worksheet as rows of optional cell text.
///
/// `rows[0]` is Excel row 1; a `None` cell is empty.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub name: String,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

// ---------------------------------------------------------------------------
// Alma
// ---------------------------------------------------------------------------

pub const ALMA_PACKAGE_ID: &str = "PACKAGE_ID";
pub const ALMA_PACKAGE_NAME: &str = "PACKAGE_NAME";
pub const ALMA_SERVICE_TYPE: &str = "SERVICE_TYPE";

/// Join key column in the Alma package table.
pub const ALMA_NAME_NORM: &str = "Alma_PACKAGE_NAME_norm";

/// One package row pulled out of the activation workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlmaPackage {
    #[serde(rename = "SheetName")]
    pub sheet_name: String,
    #[serde(rename = "ExcelRow")]
    pub excel_row: usize,
    #[serde(rename = "Alma_PACKAGE_ID")]
    pub package_id: String,
    #[serde(rename = "Alma_PACKAGE_NAME")]
    pub package_name: String,
    #[serde(rename = "Alma_PACKAGE_NAME_norm")]
    pub normalized_name: String,
    #[serde(rename = "SERVICE_TYPE")]
    pub service_type: String,
}

impl AlmaPackage {
    pub const HEADERS: [&'static str; 6] = [
        "SheetName",
        "ExcelRow",
        "Alma_PACKAGE_ID",
        "Alma_PACKAGE_NAME",
        ALMA_NAME_NORM,
        "SERVICE_TYPE",
    ];
}

// ---------------------------------------------------------------------------
// EDS
// ---------------------------------------------------------------------------

pub const EDS_REQUIRED: [&str; 6] = [
    "PackageID",
    "PackageName",
    "VendorName",
    "PackageType",
    "PackageAccess",
    "ResourceType",
];

/// Join key column in the deduplicated EDS package table.
pub const EDS_NAME_NORM: &str = "EDS_PackageName_norm";

/// Everything that makes two EDS title rows the same package.
///
/// Resource type is deliberately absent: titles in one package may disagree on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageKey {
    pub package_id: String,
    pub normalized_name: String,
    pub vendor: String,
    pub package_type: String,
    pub package_access: String,
}

/// One distinct EDS package with the number of title rows folded into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdsPackage {
    #[serde(rename = "EDS_PackageID")]
    pub package_id: String,
    #[serde(rename = "EDS_PackageName")]
    pub package_name: String,
    #[serde(rename = "EDS_PackageName_norm")]
    pub normalized_name: String,
    #[serde(rename = "VendorName")]
    pub vendor: String,
    #[serde(rename = "PackageType")]
    pub package_type: String,
    #[serde(rename = "PackageAccess")]
    pub package_access: String,
    #[serde(rename = "AnyResourceType")]
    pub any_resource_type: String,
    #[serde(rename = "TitleCount")]
    pub title_count: usize,
}

impl EdsPackage {
    pub const HEADERS: [&'static str; 8] = [
        "EDS_PackageID",
        "EDS_PackageName",
        EDS_NAME_NORM,
        "VendorName",
        "PackageType",
        "PackageAccess",
        "AnyResourceType",
        "TitleCount",
    ];

    pub fn key(&self) -> PackageKey {
        PackageKey {
            package_id: self.package_id.clone(),
            normalized_name: self.normalized_name.clone(),
            vendor: self.vendor.clone(),
            package_type: self.package_type.clone(),
            package_access: self.package_access.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactName,
}

/// One EDS package paired with one Alma package of the same normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "MatchType")]
    pub match_type: MatchType,
    #[serde(rename = "EDS_PackageName")]
    pub eds_package_name: String,
    #[serde(rename = "EDS_PackageID")]
    pub eds_package_id: String,
    #[serde(rename = "VendorName")]
    pub vendor: String,
    #[serde(rename = "Alma_PACKAGE_NAME")]
    pub alma_package_name: String,
    #[serde(rename = "Alma_PACKAGE_ID")]
    pub alma_package_id: String,
    #[serde(rename = "SheetName")]
    pub sheet_name: String,
    #[serde(rename = "ExcelRow")]
    pub excel_row: String,
    #[serde(rename = "SERVICE_TYPE")]
    pub service_type: String,
    #[serde(rename = "TitleCount")]
    pub title_count: String,
}

impl MatchRecord {
    pub const HEADERS: [&'static str; 10] = [
        "MatchType",
        "EDS_PackageName",
        "EDS_PackageID",
        "VendorName",
        "Alma_PACKAGE_NAME",
        "Alma_PACKAGE_ID",
        "SheetName",
        "ExcelRow",
        "SERVICE_TYPE",
        "TitleCount",
    ];
}

/// Matches plus the rows of each side that found no partner.
///
/// Unmatched rows borrow from the input tables and keep their original columns.
#[derive(Debug)]
pub struct MatchOutput<'a> {
    pub matches: Vec<MatchRecord>,
    pub eds_unmatched: Vec<&'a [String]>,
    pub alma_unmatched: Vec<&'a [String]>,
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    pub sheets: Vec<SheetSummary>,
    pub missing_sheets: Vec<String>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub unique_packages: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub exact_matches: usize,
    pub eds_unmatched: usize,
    pub alma_unmatched: usize,
}

impl MatchOutput<'_> {
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            exact_matches: self.matches.len(),
            eds_unmatched: self.eds_unmatched.len(),
            alma_unmatched: self.alma_unmatched.len(),
        }
    }
}
