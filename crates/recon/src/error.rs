use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Required columns absent from a sheet or file header.
    MissingColumns { source: String, columns: Vec<String> },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero threshold, no sheets, etc.).
    ConfigValidation(String),
    /// IO error (file read, malformed CSV record, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns { source, columns } => {
                let list = columns
                    .iter()
                    .map(|c| format!("'{c}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                if columns.len() == 1 {
                    write!(f, "{source}: missing expected column {list}")
                } else {
                    write!(f, "{source}: missing expected columns {list}")
                }
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
