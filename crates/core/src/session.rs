//! The five-step wizard.
//!
//! A [`Session`] is the whole state of one walk through the form. It is owned by
//! whoever drives the wizard (the CLI loop or the REST session store) and holds
//! only a shared, read-only handle to the catalog and procedure book.
//!
//! Steps run strictly in order:
//!
//! ```text
//! PatientInfo -> OperationSelect -> EquipmentSelect -> CostSummary -> ReceiptExport
//! ```
//!
//! Moving forward or back never depends on what was entered. Entering a step
//! runs its hook:
//!
//! - `EquipmentSelect` seeds the selection from the chosen operation's preset,
//!   but only when the selection is empty or the operation changed since the
//!   last seeding. Otherwise edits made earlier are kept.
//! - `CostSummary` recomputes the totals.

use crate::calculator::{calculate, CostSummary};
use crate::procedures::OperationChoice;
use crate::receipt::{render_pdf, ReceiptFont, ReceiptInput, ReceiptLayout};
use crate::selection::EquipmentSelection;
use crate::{CathlabError, CathlabResult, PatientInfo, ReferenceData};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PatientInfo,
    OperationSelect,
    EquipmentSelect,
    CostSummary,
    ReceiptExport,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::PatientInfo,
        WizardStep::OperationSelect,
        WizardStep::EquipmentSelect,
        WizardStep::CostSummary,
        WizardStep::ReceiptExport,
    ];

    /// Zero-based position in the wizard.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Screen title.
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::PatientInfo => "Patient Information",
            WizardStep::OperationSelect => "Select Operation",
            WizardStep::EquipmentSelect => "Select Equipment",
            WizardStep::CostSummary => "Cost Summary",
            WizardStep::ReceiptExport => "Generate PDF Summary",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// State accumulated across one pass through the wizard.
#[derive(Debug, Clone)]
pub struct Session {
    reference: Arc<ReferenceData>,
    step: WizardStep,
    patient: PatientInfo,
    operation: Option<OperationChoice>,
    selection: EquipmentSelection,
    seeded_for: Option<OperationChoice>,
    summary: Option<CostSummary>,
}

impl Session {
    /// Starts a session on the patient step with nothing entered.
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self {
            reference,
            step: WizardStep::PatientInfo,
            patient: PatientInfo::default(),
            operation: None,
            selection: EquipmentSelection::new(),
            seeded_for: None,
            summary: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn operation(&self) -> Option<&OperationChoice> {
        self.operation.as_ref()
    }

    /// Name of the chosen operation, or an empty string before one is chosen.
    pub fn operation_name(&self) -> &str {
        self.operation.as_ref().map_or("", OperationChoice::name)
    }

    pub fn selection(&self) -> &EquipmentSelection {
        &self.selection
    }

    /// Totals computed when the cost summary step was last entered.
    pub fn summary(&self) -> Option<&CostSummary> {
        self.summary.as_ref()
    }

    fn expect_step(&self, expected: WizardStep) -> CathlabResult<()> {
        if self.step != expected {
            return Err(CathlabError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    /// Records the patient form. Only accepted on the patient step.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::WrongStep`] on any other step.
    pub fn submit_patient(&mut self, patient: PatientInfo) -> CathlabResult<()> {
        self.expect_step(WizardStep::PatientInfo)?;
        self.patient = patient;
        Ok(())
    }

    /// Records the operation choice. Only accepted on the operation step.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if:
    /// - the session is on another step,
    /// - a preset is named that the procedure book does not contain.
    pub fn choose_operation(&mut self, choice: OperationChoice) -> CathlabResult<()> {
        self.expect_step(WizardStep::OperationSelect)?;
        if let OperationChoice::Preset { name } = &choice {
            if self.reference.procedures.preset(name.as_str()).is_none() {
                return Err(CathlabError::UnknownOperation(name.to_string()));
            }
        }
        self.operation = Some(choice);
        Ok(())
    }

    /// Sets one equipment quantity. Only accepted on the equipment step.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if:
    /// - the session is on another step,
    /// - the item is neither in the catalog nor already in the selection,
    /// - the item is limited and `quantity > 1`.
    pub fn set_quantity(&mut self, name: &str, quantity: u32) -> CathlabResult<()> {
        self.expect_step(WizardStep::EquipmentSelect)?;
        self.check_quantity(name, quantity)?;
        self.selection.insert(name, quantity);
        Ok(())
    }

    /// Sets several quantities at once. Nothing is applied if any entry is rejected.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Session::set_quantity`].
    pub fn set_quantities<'a, I>(&mut self, quantities: I) -> CathlabResult<()>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        self.expect_step(WizardStep::EquipmentSelect)?;
        let quantities: Vec<_> = quantities.into_iter().collect();
        for &(name, quantity) in &quantities {
            self.check_quantity(name, quantity)?;
        }
        for (name, quantity) in quantities {
            self.selection.insert(name, quantity);
        }
        Ok(())
    }

    fn check_quantity(&self, name: &str, quantity: u32) -> CathlabResult<()> {
        let known = self.reference.catalog.contains(name)
            || self.selection.iter().any(|item| item.name == name);
        if !known {
            return Err(CathlabError::UnknownEquipment(name.to_string()));
        }
        self.reference.procedures.check_quantity(name, quantity)
    }

    /// Advances one step and runs the new step's entry hook.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::NoNextStep`] on the receipt step; the session is unchanged.
    pub fn next(&mut self) -> CathlabResult<WizardStep> {
        let next = self.step.next().ok_or(CathlabError::NoNextStep(self.step))?;
        self.enter(next);
        Ok(next)
    }

    /// Goes back one step and runs that step's entry hook.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::NoPreviousStep`] on the patient step; the session is unchanged.
    pub fn previous(&mut self) -> CathlabResult<WizardStep> {
        let previous = self
            .step
            .previous()
            .ok_or(CathlabError::NoPreviousStep(self.step))?;
        self.enter(previous);
        Ok(previous)
    }

    fn enter(&mut self, step: WizardStep) {
        tracing::debug!("wizard: {} -> {}", self.step, step);
        self.step = step;
        match step {
            WizardStep::EquipmentSelect => self.seed_selection(),
            WizardStep::CostSummary => self.summary = Some(self.compute_summary()),
            _ => {}
        }
    }

    fn seed_selection(&mut self) {
        if !self.selection.is_empty() && self.seeded_for == self.operation {
            return;
        }

        let preset = match &self.operation {
            Some(OperationChoice::Preset { name }) => {
                self.reference.procedures.preset(name.as_str())
            }
            _ => None,
        };
        self.selection = EquipmentSelection::seeded(&self.reference.catalog, preset);
        self.seeded_for = self.operation.clone();
    }

    /// Totals for the current selection under the patient's scheme.
    pub fn compute_summary(&self) -> CostSummary {
        calculate(
            &self.reference.catalog,
            &self.selection,
            self.patient.scheme,
        )
    }

    /// Lays out the receipt from current state. Only available on the receipt step.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::WrongStep`] on any other step.
    pub fn receipt_layout(&self, currency: &str) -> CathlabResult<ReceiptLayout> {
        self.expect_step(WizardStep::ReceiptExport)?;
        let summary = self.compute_summary();
        Ok(ReceiptLayout::build(&ReceiptInput {
            patient: &self.patient,
            operation: self.operation_name(),
            selection: &self.selection,
            summary: &summary,
            currency,
        }))
    }

    /// Renders the receipt PDF. Only available on the receipt step.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if the session is on another step or rendering fails.
    pub fn render_receipt(&self, currency: &str, font: &ReceiptFont) -> CathlabResult<Vec<u8>> {
        let layout = self.receipt_layout(currency)?;
        render_pdf(&layout, font)
    }
}
