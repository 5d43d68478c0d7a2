//! Cost and reimbursement totals for an equipment selection.

use crate::catalog::EquipmentCatalog;
use crate::scheme::Scheme;
use crate::selection::EquipmentSelection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One priced item of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLine {
    pub name: String,
    pub quantity: u32,
    pub unit_cost: Decimal,
    pub cost: Decimal,
    pub reimbursement: Decimal,
}

/// Totals for a selection under one scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_cost: Decimal,
    pub total_reimbursement: Decimal,
    pub out_of_pocket: Decimal,
    pub lines: Vec<CostLine>,
    /// Selected items (quantity above zero) that the catalog could not price.
    pub unmatched: Vec<String>,
}

/// Portion of `cost` not covered by `reimbursement`, never below zero.
pub fn out_of_pocket(cost: Decimal, reimbursement: Decimal) -> Decimal {
    (cost - reimbursement).max(Decimal::ZERO)
}

/// Sums cost and reimbursement over every used item of `selection`.
///
/// Items missing from the catalog add nothing to either total; they are listed in
/// [`CostSummary::unmatched`] and logged.
pub fn calculate(
    catalog: &EquipmentCatalog,
    selection: &EquipmentSelection,
    scheme: Scheme,
) -> CostSummary {
    let mut summary = CostSummary::default();

    for item in selection.used() {
        let Some(entry) = catalog.lookup(&item.name) else {
            tracing::warn!(
                "'{}' (quantity {}) is not in the equipment catalog and was left out of the totals",
                item.name,
                item.quantity
            );
            summary.unmatched.push(item.name.clone());
            continue;
        };

        let quantity = Decimal::from(item.quantity);
        // Amounts saturate at `Decimal::MAX` instead of overflowing.
        let cost = quantity.saturating_mul(entry.unit_cost());
        let reimbursement = quantity.saturating_mul(entry.rate(scheme));

        summary.total_cost = summary.total_cost.saturating_add(cost);
        summary.total_reimbursement = summary.total_reimbursement.saturating_add(reimbursement);
        summary.lines.push(CostLine {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_cost: entry.unit_cost(),
            cost,
            reimbursement,
        });
    }

    summary.out_of_pocket = out_of_pocket(summary.total_cost, summary.total_reimbursement);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::ProcedureBook;

    fn catalog(rows: &str) -> EquipmentCatalog {
        EquipmentCatalog::from_reader(
            format!(
                "equipment,Cost,Universal healthcare,UCEP,Social Security,Civil Service,Self pay\n{rows}"
            )
            .as_bytes(),
        )
        .expect("catalog")
    }

    #[test]
    fn angiogram_under_universal_scheme() {
        let catalog = catalog("Angiogram,1000,800,1200,0,1000,\n");
        let selection = EquipmentSelection::from_quantities([("Angiogram", 1)]);

        let summary = calculate(&catalog, &selection, Scheme::Universal);
        assert_eq!(summary.total_cost, Decimal::from(1000));
        assert_eq!(summary.total_reimbursement, Decimal::from(800));
        assert_eq!(summary.out_of_pocket, Decimal::from(200));
    }

    #[test]
    fn out_of_pocket_clamps_when_reimbursement_exceeds_cost() {
        let catalog = catalog("Angiogram,1000,800,1200,0,1000,\n");
        let selection = EquipmentSelection::from_quantities([("Angiogram", 1)]);

        let summary = calculate(&catalog, &selection, Scheme::Ucep);
        assert_eq!(summary.total_cost, Decimal::from(1000));
        assert_eq!(summary.total_reimbursement, Decimal::from(1200));
        assert_eq!(summary.out_of_pocket, Decimal::ZERO);
    }

    #[test]
    fn out_of_pocket_is_difference_or_zero() {
        let cases = [(0, 0, 0), (500, 200, 300), (200, 500, 0), (700, 700, 0)];
        for (cost, reimbursement, expected) in cases {
            assert_eq!(
                out_of_pocket(Decimal::from(cost), Decimal::from(reimbursement)),
                Decimal::from(expected),
                "cost {cost}, reimbursement {reimbursement}"
            );
        }
    }

    #[test]
    fn zero_quantities_give_zero_totals() {
        let catalog = catalog("Angiogram,1000,800,1200,0,1000,\nCoil,24000,15000,0,0,0,\n");
        let selection = EquipmentSelection::seeded(&catalog, None);

        for scheme in Scheme::ALL {
            let summary = calculate(&catalog, &selection, scheme);
            assert_eq!(summary.total_cost, Decimal::ZERO);
            assert_eq!(summary.total_reimbursement, Decimal::ZERO);
            assert_eq!(summary.out_of_pocket, Decimal::ZERO);
            assert!(summary.lines.is_empty());
        }
    }

    #[test]
    fn unknown_items_add_nothing_and_are_reported() {
        let catalog = catalog("Angiogram,1000,800,1200,0,1000,\n");
        let selection =
            EquipmentSelection::from_quantities([("Angiogram", 2), ("Glue", 3), ("Ghost", 0)]);

        let summary = calculate(&catalog, &selection, Scheme::Universal);
        assert_eq!(summary.total_cost, Decimal::from(2000));
        assert_eq!(summary.total_reimbursement, Decimal::from(1600));
        assert_eq!(summary.unmatched, vec!["Glue".to_string()]);
    }

    #[test]
    fn multiplies_quantities_and_keeps_fractions() {
        let catalog = catalog("Contrast media,1500.50,1000.25,0,0,0,\n");
        let selection = EquipmentSelection::from_quantities([("Contrast media", 4)]);

        let summary = calculate(&catalog, &selection, Scheme::Universal);
        assert_eq!(summary.total_cost, Decimal::new(600200, 2));
        assert_eq!(summary.total_reimbursement, Decimal::new(400100, 2));
        assert_eq!(summary.out_of_pocket, Decimal::new(200100, 2));
        assert_eq!(summary.lines[0].unit_cost, Decimal::new(150050, 2));
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let catalog = catalog(&format!(
            "Stent,{max},{max},0,0,0,\nWire,1,1,0,0,0,\n",
            max = Decimal::MAX
        ));
        let selection = EquipmentSelection::from_quantities([("Stent", u32::MAX), ("Wire", 3)]);

        let summary = calculate(&catalog, &selection, Scheme::Universal);
        assert_eq!(summary.lines[0].cost, Decimal::MAX);
        assert_eq!(summary.total_cost, Decimal::MAX);
        assert_eq!(summary.total_reimbursement, Decimal::MAX);
        assert_eq!(summary.out_of_pocket, Decimal::ZERO);
    }

    #[test]
    fn unmodified_preset_reproduces_preset_quantities() {
        let catalog = catalog(
            "Angiogram,1000,800,0,0,0,\nContrast media,100,50,0,0,0,\nCoil,2000,1000,0,0,0,\n",
        );
        let book = ProcedureBook::from_yaml_str(
            "operations:\n  - name: Angio\n    equipment:\n      Angiogram: 1\n      Contrast media: 4\n",
        )
        .expect("book");
        let preset = book.preset("Angio").expect("preset");

        let selection = EquipmentSelection::seeded(&catalog, Some(preset));
        let summary = calculate(&catalog, &selection, Scheme::Universal);

        let priced: Vec<_> = summary
            .lines
            .iter()
            .map(|l| (l.name.as_str(), l.quantity))
            .collect();
        assert_eq!(priced, [("Angiogram", 1), ("Contrast media", 4)]);
        assert_eq!(summary.total_cost, Decimal::from(1400));
        assert_eq!(summary.total_reimbursement, Decimal::from(1000));
    }
}
