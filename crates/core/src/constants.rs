//! Constants used throughout the cathlab core crate.
//!
//! File locations, catalog column names and receipt defaults live here so the
//! loaders, the renderer and the outer surfaces agree on them.

/// Default location of the equipment catalog, relative to the workspace root.
pub const DEFAULT_CATALOG_PATH: &str = "crates/core/data/equipment.csv";

/// Procedure book compiled into the binary, used when no override file is configured.
pub const BUILTIN_PROCEDURES_YAML: &str = include_str!("../data/procedures.yaml");

/// Catalog column holding the equipment name (the unique row key).
pub const EQUIPMENT_COLUMN: &str = "equipment";

/// Catalog column holding the unit cost.
pub const COST_COLUMN: &str = "Cost";

/// Catalog file extensions read as spreadsheet workbooks rather than CSV.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Currency label printed after every amount.
pub const DEFAULT_CURRENCY: &str = "THB";

/// Fixed filename offered for the downloaded receipt.
pub const RECEIPT_FILENAME: &str = "summary.pdf";

/// Idle time after which an abandoned wizard session may be discarded.
pub const DEFAULT_SESSION_TTL_MINUTES: u64 = 120;
