//! # API Shared
//!
//! Request and response types for the cathlab REST API, plus the shared
//! `HealthService`.
//!
//! Amounts cross the wire as decimal strings so no precision is lost to JSON
//! floating point.

pub mod health;

pub use health::HealthService;

use cathlab_core::{
    CostLine, CostSummary, EquipmentEntry, OperationPreset, PatientInfo, ReferenceData, Scheme,
    Session, WizardStep,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SchemeRes {
    /// Form code, "A" to "E".
    pub code: String,
    /// Catalog column label.
    pub label: String,
}

impl From<Scheme> for SchemeRes {
    fn from(scheme: Scheme) -> Self {
        Self {
            code: scheme.code().to_string(),
            label: scheme.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListSchemesRes {
    pub schemes: Vec<SchemeRes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SchemeRateRes {
    pub code: String,
    pub rate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemRes {
    pub name: String,
    pub unit_cost: String,
    pub rates: Vec<SchemeRateRes>,
    /// Quantity is a yes/no choice for this item.
    pub limited: bool,
}

impl CatalogItemRes {
    pub fn from_entry(entry: &EquipmentEntry, limited: bool) -> Self {
        Self {
            name: entry.name().to_string(),
            unit_cost: entry.unit_cost().normalize().to_string(),
            rates: Scheme::ALL
                .into_iter()
                .map(|scheme| SchemeRateRes {
                    code: scheme.code().to_string(),
                    rate: entry.rate(scheme).normalize().to_string(),
                })
                .collect(),
            limited,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListCatalogRes {
    pub items: Vec<CatalogItemRes>,
}

impl From<&ReferenceData> for ListCatalogRes {
    fn from(reference: &ReferenceData) -> Self {
        Self {
            items: reference
                .catalog
                .entries()
                .iter()
                .map(|e| CatalogItemRes::from_entry(e, reference.procedures.is_limited(e.name())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuantityDto {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationRes {
    pub name: String,
    pub equipment: Vec<QuantityDto>,
}

impl From<&OperationPreset> for OperationRes {
    fn from(preset: &OperationPreset) -> Self {
        Self {
            name: preset.name.to_string(),
            equipment: preset
                .equipment
                .iter()
                .map(|(name, &quantity)| QuantityDto {
                    name: name.to_string(),
                    quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListOperationsRes {
    pub operations: Vec<OperationRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteReq {
    /// Scheme code or label.
    pub scheme: String,
    #[serde(default)]
    pub quantities: Vec<QuantityDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CostLineRes {
    pub name: String,
    pub quantity: u32,
    pub unit_cost: String,
    pub cost: String,
    pub reimbursement: String,
}

impl From<&CostLine> for CostLineRes {
    fn from(line: &CostLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_cost: line.unit_cost.normalize().to_string(),
            cost: line.cost.normalize().to_string(),
            reimbursement: line.reimbursement.normalize().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CostSummaryRes {
    pub total_cost: String,
    pub total_reimbursement: String,
    pub out_of_pocket: String,
    pub currency: String,
    pub lines: Vec<CostLineRes>,
    /// Selected items missing from the catalog; they add nothing to the totals.
    pub unmatched: Vec<String>,
}

impl CostSummaryRes {
    pub fn from_summary(summary: &CostSummary, currency: &str) -> Self {
        Self {
            total_cost: summary.total_cost.normalize().to_string(),
            total_reimbursement: summary.total_reimbursement.normalize().to_string(),
            out_of_pocket: summary.out_of_pocket.normalize().to_string(),
            currency: currency.to_string(),
            lines: summary.lines.iter().map(CostLineRes::from).collect(),
            unmatched: summary.unmatched.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientReq {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub diagnosis: String,
    /// Scheme code or label; defaults to "A".
    #[serde(default)]
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub first_name: String,
    pub last_name: String,
    pub record_id: String,
    pub diagnosis: String,
    pub scheme: SchemeRes,
}

impl From<&PatientInfo> for PatientRes {
    fn from(info: &PatientInfo) -> Self {
        Self {
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            record_id: info.record_id.clone(),
            diagnosis: info.diagnosis.clone(),
            scheme: info.scheme.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationReq {
    #[serde(default)]
    pub name: String,
    /// Free-text operation outside the preset list.
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentReq {
    pub quantities: Vec<QuantityDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentRowRes {
    pub name: String,
    pub quantity: u32,
    pub limited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub id: String,
    /// Step key, e.g. "equipment_select".
    #[schema(value_type = String, example = "equipment_select")]
    pub step: WizardStep,
    pub step_index: usize,
    pub title: String,
    pub patient: PatientRes,
    pub operation: String,
    pub equipment: Vec<EquipmentRowRes>,
    pub summary: Option<CostSummaryRes>,
}

impl SessionRes {
    pub fn from_session(id: &str, session: &Session, currency: &str) -> Self {
        let procedures = &session.reference().procedures;
        let step = session.step();
        Self {
            id: id.to_string(),
            step,
            step_index: step.index(),
            title: step.title().to_string(),
            patient: session.patient().into(),
            operation: session.operation_name().to_string(),
            equipment: session
                .selection()
                .iter()
                .map(|item| EquipmentRowRes {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    limited: procedures.is_limited(&item.name),
                })
                .collect(),
            summary: session
                .summary()
                .map(|s| CostSummaryRes::from_summary(s, currency)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cathlab_core::{calculate, EquipmentCatalog, EquipmentSelection, ProcedureBook};
    use std::sync::Arc;

    #[test]
    fn summary_amounts_are_plain_decimal_strings() {
        let catalog = EquipmentCatalog::from_reader(
            "equipment,Cost,Universal healthcare,UCEP,Social Security,Civil Service,Self pay\n\
             Angiogram,1000.00,800,1200,0,1000,\n"
                .as_bytes(),
        )
        .expect("catalog");
        let selection = EquipmentSelection::from_quantities([("Angiogram", 1), ("Glue", 1)]);
        let summary = calculate(&catalog, &selection, Scheme::Universal);

        let res = CostSummaryRes::from_summary(&summary, "THB");
        assert_eq!(res.total_cost, "1000");
        assert_eq!(res.total_reimbursement, "800");
        assert_eq!(res.out_of_pocket, "200");
        assert_eq!(res.lines[0].unit_cost, "1000");
        assert_eq!(res.unmatched, ["Glue"]);
    }

    #[test]
    fn patient_request_fields_are_optional() {
        let req: PatientReq = serde_json::from_str("{}").expect("empty");
        assert_eq!(req, PatientReq::default());
    }

    #[test]
    fn scheme_res_carries_code_and_label() {
        let res = SchemeRes::from(Scheme::CivilService);
        assert_eq!(res.code, "D");
        assert_eq!(res.label, "Civil Service");
    }

    #[test]
    fn session_step_serializes_as_its_snake_case_key() {
        let reference = Arc::new(ReferenceData::new(
            EquipmentCatalog::default(),
            ProcedureBook::builtin().expect("builtin"),
        ));
        let mut session = Session::new(reference);
        for _ in 0..4 {
            session.next().expect("advance");
        }

        let res = SessionRes::from_session("abc", &session, "THB");
        assert_eq!(res.step, WizardStep::ReceiptExport);
        let json = serde_json::to_value(&res).expect("json");
        assert_eq!(json["step"], "receipt_export");
        assert_eq!(json["step_index"], 4);
    }
}
