//! `pkgmatch-recon`: EDS / Alma package reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables and sheets, returns package
//! lists and match partitions. No CLI or IO dependencies.

pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod schema;

pub use config::PipelineConfig;
pub use dedup::{dedup_packages, Dedup};
pub use error::ReconError;
pub use extract::{extract_packages, Extraction};
pub use matcher::{join_by_name, match_packages};
pub use model::{AlmaPackage, EdsPackage, MatchOutput, MatchRecord, Table, Workbook, Worksheet};
pub use normalize::normalize;
