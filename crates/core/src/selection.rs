//! Equipment quantities chosen for a procedure.

use crate::catalog::EquipmentCatalog;
use crate::procedures::{OperationPreset, ProcedureBook};
use crate::CathlabResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub name: String,
    pub quantity: u32,
}

/// Ordered mapping from equipment name to quantity.
///
/// Order is preserved so the equipment step and the receipt list items the way
/// the catalog does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentSelection {
    items: Vec<SelectedItem>,
}

impl EquipmentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the starting selection for the equipment step.
    ///
    /// Every catalog item appears in catalog order with the preset's default (or 0).
    /// Preset items the catalog does not know are appended afterwards so that the
    /// preset is reproduced exactly and the gap shows up in the cost summary.
    pub fn seeded(catalog: &EquipmentCatalog, preset: Option<&OperationPreset>) -> Self {
        let mut selection = Self::new();
        for entry in catalog.entries() {
            let quantity = preset.map_or(0, |p| p.default_quantity(entry.name()));
            selection.insert(entry.name(), quantity);
        }
        if let Some(preset) = preset {
            for (name, &quantity) in &preset.equipment {
                if !catalog.contains(name.as_str()) {
                    selection.insert(name.as_str(), quantity);
                }
            }
        }
        selection
    }

    /// Builds a selection from raw pairs, keeping first-seen order. Later pairs
    /// for the same name overwrite earlier ones.
    pub fn from_quantities<I, S>(quantities: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for (name, quantity) in quantities {
            selection.insert(name, quantity);
        }
        selection
    }

    /// Sets `name` to `quantity`, appending it if absent. No limits are checked.
    pub fn insert(&mut self, name: impl Into<String>, quantity: u32) {
        let name = name.into();
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(item) => item.quantity = quantity,
            None => self.items.push(SelectedItem { name, quantity }),
        }
    }

    /// Sets a quantity as the equipment step would, enforcing the 0/1 bound for
    /// limited items.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::LimitedQuantity`] if `name` is limited and `quantity > 1`.
    pub fn set_quantity(
        &mut self,
        name: &str,
        quantity: u32,
        procedures: &ProcedureBook,
    ) -> CathlabResult<()> {
        procedures.check_quantity(name, quantity)?;
        self.insert(name, quantity);
        Ok(())
    }

    pub fn quantity(&self, name: &str) -> u32 {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map_or(0, |item| item.quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedItem> {
        self.items.iter()
    }

    /// Items with a quantity above zero.
    pub fn used(&self) -> impl Iterator<Item = &SelectedItem> {
        self.items.iter().filter(|item| item.quantity > 0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
