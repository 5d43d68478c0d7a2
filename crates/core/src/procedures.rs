//! Operation presets and limited equipment.
//!
//! The procedure book is a small YAML document:
//!
//! ```yaml
//! limited_items: [destination, Fubuki]
//! operations:
//!   - name: Diagnostic angiogram
//!     equipment:
//!       Angiogram: 1
//!       Contrast media: 4
//! ```
//!
//! A copy ships inside the binary ([`ProcedureBook::builtin`]); deployments may
//! point `CATHLAB_PROCEDURES_PATH` at their own file instead.

use crate::catalog::EquipmentCatalog;
use crate::constants::BUILTIN_PROCEDURES_YAML;
use crate::{CathlabError, CathlabResult};
use cathlab_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A named set of default equipment quantities for one procedure type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPreset {
    pub name: NonEmptyText,
    #[serde(default)]
    pub equipment: BTreeMap<NonEmptyText, u32>,
}

impl OperationPreset {
    /// Default quantity for `item`, zero when the preset does not mention it.
    pub fn default_quantity(&self, item: &str) -> u32 {
        self.equipment.get(item).copied().unwrap_or(0)
    }
}

/// What the user picked on the operation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationChoice {
    /// One of the presets in the procedure book.
    Preset { name: NonEmptyText },
    /// A free-text operation with no default equipment. May be blank.
    Custom { name: String },
}

impl OperationChoice {
    pub fn name(&self) -> &str {
        match self {
            OperationChoice::Preset { name } => name.as_str(),
            OperationChoice::Custom { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProcedureBookFile {
    #[serde(default)]
    limited_items: Vec<NonEmptyText>,
    #[serde(default)]
    operations: Vec<OperationPreset>,
}

/// Immutable table of operation presets plus the set of limited items.
#[derive(Debug, Clone, Default)]
pub struct ProcedureBook {
    operations: Vec<OperationPreset>,
    limited_items: BTreeSet<NonEmptyText>,
}

impl ProcedureBook {
    /// Parses the procedure book compiled into the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled YAML is itself invalid.
    pub fn builtin() -> CathlabResult<Self> {
        Self::from_yaml_str(BUILTIN_PROCEDURES_YAML)
    }

    /// Loads a procedure book from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if the file cannot be read or fails validation
    /// (see [`ProcedureBook::from_yaml_str`]).
    pub fn load(path: impl AsRef<Path>) -> CathlabResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(CathlabError::ProceduresRead)?;
        let book = Self::from_yaml_str(&contents)?;
        tracing::info!(
            "loaded {} operation presets from {}",
            book.operations.len(),
            path.display()
        );
        Ok(book)
    }

    /// Parses and validates a procedure book.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if:
    /// - the YAML is malformed, has unknown keys, or holds blank names,
    /// - an operation name is repeated,
    /// - a preset defaults a limited item to more than 1.
    pub fn from_yaml_str(yaml: &str) -> CathlabResult<Self> {
        let file: ProcedureBookFile =
            serde_yaml::from_str(yaml).map_err(CathlabError::YamlDeserialization)?;

        let limited_items: BTreeSet<NonEmptyText> = file.limited_items.into_iter().collect();

        let mut seen = BTreeSet::new();
        for preset in &file.operations {
            if !seen.insert(preset.name.as_str()) {
                return Err(CathlabError::DuplicateOperation(preset.name.to_string()));
            }
            for (item, &quantity) in &preset.equipment {
                if quantity > 1 && limited_items.contains(item) {
                    return Err(CathlabError::LimitedQuantity {
                        name: item.to_string(),
                        quantity,
                    });
                }
            }
        }

        Ok(Self {
            operations: file.operations,
            limited_items,
        })
    }

    /// Presets in document order.
    pub fn operations(&self) -> &[OperationPreset] {
        &self.operations
    }

    pub fn preset(&self, name: &str) -> Option<&OperationPreset> {
        self.operations.iter().find(|p| p.name.as_str() == name)
    }

    /// Resolves a submitted operation name: a preset if one matches, otherwise custom.
    pub fn choose(&self, name: &str) -> OperationChoice {
        match self.preset(name) {
            Some(preset) => OperationChoice::Preset {
                name: preset.name.clone(),
            },
            None => OperationChoice::Custom {
                name: name.to_string(),
            },
        }
    }

    pub fn is_limited(&self, item: &str) -> bool {
        self.limited_items.contains(item)
    }

    /// Rejects quantities above 1 for limited items.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::LimitedQuantity`] if `item` is limited and `quantity > 1`.
    pub fn check_quantity(&self, item: &str, quantity: u32) -> CathlabResult<()> {
        if quantity > 1 && self.is_limited(item) {
            return Err(CathlabError::LimitedQuantity {
                name: item.to_string(),
                quantity,
            });
        }
        Ok(())
    }

    pub fn limited_items(&self) -> impl Iterator<Item = &str> {
        self.limited_items.iter().map(NonEmptyText::as_str)
    }

    /// Preset items that the catalog cannot price, as `(operation, item)` pairs.
    ///
    /// Each one is logged at WARN; these items would otherwise drop out of every
    /// cost summary for that operation.
    pub fn missing_from_catalog(&self, catalog: &EquipmentCatalog) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for preset in &self.operations {
            for item in preset.equipment.keys() {
                if !catalog.contains(item.as_str()) {
                    tracing::warn!(
                        "operation '{}' defaults '{}' which is not in the equipment catalog",
                        preset.name,
                        item
                    );
                    missing.push((preset.name.to_string(), item.to_string()));
                }
            }
        }
        missing
    }
}
