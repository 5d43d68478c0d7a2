//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! services that need it. Nothing reads environment variables while a wizard
//! session is being served.
//!
//! | Variable                      | Meaning                                   |
//! |-------------------------------|-------------------------------------------|
//! | `CATHLAB_CATALOG_PATH`        | Equipment catalog CSV                     |
//! | `CATHLAB_PROCEDURES_PATH`     | Procedure book YAML (built-in if unset)   |
//! | `CATHLAB_CURRENCY`            | Currency label on amounts                 |
//! | `CATHLAB_RECEIPT_FONT`        | TrueType font for receipts                |
//! | `CATHLAB_SESSION_TTL_MINUTES` | Idle time before a session is discarded   |

use crate::constants::{DEFAULT_CATALOG_PATH, DEFAULT_CURRENCY, DEFAULT_SESSION_TTL_MINUTES};
use crate::{CathlabError, CathlabResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    catalog_path: PathBuf,
    procedures_path: Option<PathBuf>,
    currency: String,
    receipt_font: Option<PathBuf>,
    session_ttl_minutes: u64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::InvalidInput`] if the currency label is blank or the
    /// session TTL is zero.
    pub fn new(
        catalog_path: PathBuf,
        procedures_path: Option<PathBuf>,
        currency: String,
        receipt_font: Option<PathBuf>,
        session_ttl_minutes: u64,
    ) -> CathlabResult<Self> {
        if currency.trim().is_empty() {
            return Err(CathlabError::InvalidInput("currency cannot be empty".into()));
        }
        if session_ttl_minutes == 0 {
            return Err(CathlabError::InvalidInput(
                "session TTL must be at least one minute".into(),
            ));
        }

        Ok(Self {
            catalog_path,
            procedures_path,
            currency: currency.trim().to_string(),
            receipt_font,
            session_ttl_minutes,
        })
    }

    /// Resolves every setting from `CATHLAB_*` environment variables.
    ///
    /// Intended for binaries, called once before serving.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if the catalog cannot be located or a value is invalid.
    pub fn from_env() -> CathlabResult<Self> {
        let env_path = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        Self::new(
            resolve_catalog_path(env_path("CATHLAB_CATALOG_PATH"))?,
            env_path("CATHLAB_PROCEDURES_PATH"),
            currency_from_env_value(std::env::var("CATHLAB_CURRENCY").ok()),
            env_path("CATHLAB_RECEIPT_FONT"),
            session_ttl_from_env_value(std::env::var("CATHLAB_SESSION_TTL_MINUTES").ok())?,
        )
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn procedures_path(&self) -> Option<&Path> {
        self.procedures_path.as_deref()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn receipt_font(&self) -> Option<&Path> {
        self.receipt_font.as_deref()
    }

    pub fn session_ttl_minutes(&self) -> u64 {
        self.session_ttl_minutes
    }
}

/// Resolve the equipment catalog path without reading environment variables.
///
/// If `override_path` is provided it must be an existing file. Otherwise this looks
/// for the bundled catalog relative to the current working directory and then
/// walks up from `CARGO_MANIFEST_DIR`.
///
/// # Errors
///
/// Returns [`CathlabError::InvalidInput`] if no catalog file can be found.
pub fn resolve_catalog_path(override_path: Option<PathBuf>) -> CathlabResult<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path);
        }
        return Err(CathlabError::InvalidInput(format!(
            "CATHLAB_CATALOG_PATH does not point to a file: {}",
            path.display()
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_CATALOG_PATH);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_CATALOG_PATH);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(CathlabError::InvalidInput(format!(
        "could not locate {DEFAULT_CATALOG_PATH}"
    )))
}

/// Currency label from an optional value, falling back to the default when blank.
pub fn currency_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Session TTL in minutes from an optional value.
///
/// # Errors
///
/// Returns [`CathlabError::InvalidInput`] if the value is not a positive integer.
pub fn session_ttl_from_env_value(value: Option<String>) -> CathlabResult<u64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_SESSION_TTL_MINUTES),
        Some(v) => match v.parse::<u64>() {
            Ok(minutes) if minutes > 0 => Ok(minutes),
            _ => Err(CathlabError::InvalidInput(format!(
                "CATHLAB_SESSION_TTL_MINUTES must be a positive integer, got '{v}'"
            ))),
        },
    }
}
