use serde::Deserialize;

use crate::error::ReconError;

pub const DEFAULT_SHEETS: [&str; 3] = ["LICENSED_AGG", "SELECTIVE_PKG", "DATABASE"];

/// Consecutive fully-blank rows after which a sheet is assumed to have ended.
pub const DEFAULT_BLANK_ROW_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub alma: AlmaConfig,
    pub eds: EdsConfig,
}

// ---------------------------------------------------------------------------
// Alma workbook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlmaConfig {
    /// Sheets to scan, in output order. Absent ones are skipped with a warning.
    pub sheets: Vec<String>,
    pub blank_row_limit: usize,
}

impl Default for AlmaConfig {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect(),
            blank_row_limit: DEFAULT_BLANK_ROW_LIMIT,
        }
    }
}

// ---------------------------------------------------------------------------
// EDS export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdsConfig {
    /// Package ids that mark non-package title sources (publisher sites etc.).
    /// An empty id is always skipped.
    pub skip_package_ids: Vec<String>,
}

impl Default for EdsConfig {
    fn default() -> Self {
        Self {
            skip_package_ids: vec!["0".into()],
        }
    }
}

impl EdsConfig {
    pub fn skips(&self, package_id: &str) -> bool {
        package_id.is_empty() || self.skip_package_ids.iter().any(|s| s == package_id)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.alma.sheets.is_empty() {
            return Err(ReconError::ConfigValidation(
                "alma.sheets must name at least one sheet".into(),
            ));
        }

        if self.alma.blank_row_limit == 0 {
            return Err(ReconError::ConfigValidation(
                "alma.blank_row_limit must be at least 1".into(),
            ));
        }

        if let Some(dup) = first_duplicate(&self.alma.sheets) {
            return Err(ReconError::ConfigValidation(format!(
                "alma.sheets lists '{dup}' more than once"
            )));
        }

        Ok(())
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Some(name);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(
            config.alma.sheets,
            vec!["LICENSED_AGG", "SELECTIVE_PKG", "DATABASE"]
        );
        assert_eq!(config.alma.blank_row_limit, 20);
        assert_eq!(config.eds.skip_package_ids, vec!["0"]);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
[alma]
blank_row_limit = 50
"#,
        )
        .unwrap();
        assert_eq!(config.alma.blank_row_limit, 50);
        assert_eq!(config.alma.sheets.len(), 3);
        assert_eq!(config.eds, EdsConfig::default());
    }

    #[test]
    fn custom_sheets_and_skips() {
        let config = PipelineConfig::from_toml(
            r#"
[alma]
sheets = ["DATABASE"]

[eds]
skip_package_ids = ["0", "-1"]
"#,
        )
        .unwrap();
        assert_eq!(config.alma.sheets, vec!["DATABASE"]);
        assert!(config.eds.skips("-1"));
        assert!(config.eds.skips(""));
        assert!(!config.eds.skips("55"));
    }

    #[test]
    fn empty_id_always_skipped() {
        let eds = EdsConfig {
            skip_package_ids: Vec::new(),
        };
        assert!(eds.skips(""));
        assert!(!eds.skips("0"));
    }

    #[test]
    fn reject_zero_blank_limit() {
        let err = PipelineConfig::from_toml("[alma]\nblank_row_limit = 0\n").unwrap_err();
        assert!(err.to_string().contains("blank_row_limit"));
    }

    #[test]
    fn reject_no_sheets() {
        let err = PipelineConfig::from_toml("[alma]\nsheets = []\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_duplicate_sheet() {
        let err =
            PipelineConfig::from_toml("[alma]\nsheets = [\"DATABASE\", \"DATABASE\"]\n").unwrap_err();
        assert!(err.to_string().contains("'DATABASE'"));
    }

    #[test]
    fn reject_unknown_key() {
        let err = PipelineConfig::from_toml("[alma]\nblank_rows = 5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
