//! Read-only data shared by every session.

use crate::catalog::EquipmentCatalog;
use crate::config::CoreConfig;
use crate::procedures::ProcedureBook;
use crate::CathlabResult;

/// The equipment catalog and procedure book, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub catalog: EquipmentCatalog,
    pub procedures: ProcedureBook,
}

impl ReferenceData {
    /// Pairs a catalog with a procedure book, warning about preset items the
    /// catalog cannot price.
    pub fn new(catalog: EquipmentCatalog, procedures: ProcedureBook) -> Self {
        procedures.missing_from_catalog(&catalog);
        Self {
            catalog,
            procedures,
        }
    }

    /// Loads the catalog and procedure book named by `cfg`.
    ///
    /// Uses the built-in procedure book when `cfg` names no file.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if either source is missing or malformed.
    pub fn load(cfg: &CoreConfig) -> CathlabResult<Self> {
        let catalog = EquipmentCatalog::load(cfg.catalog_path())?;
        let procedures = match cfg.procedures_path() {
            Some(path) => ProcedureBook::load(path)?,
            None => ProcedureBook::builtin()?,
        };
        Ok(Self::new(catalog, procedures))
    }
}
