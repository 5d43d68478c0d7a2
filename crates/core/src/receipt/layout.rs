use crate::calculator::CostSummary;
use crate::patient::PatientInfo;
use crate::selection::EquipmentSelection;
use rust_decimal::Decimal;
use serde::Serialize;

/// A4 width in PDF points.
pub const A4_WIDTH_PT: f32 = 595.2756;
/// A4 height in PDF points.
pub const A4_HEIGHT_PT: f32 = 841.8898;

const MARGIN_PT: f32 = 50.0;
const HEADER_INDENT_PT: f32 = 300.0;
const ITEM_INDENT_PT: f32 = 20.0;
const LINE_STEP_PT: f32 = 20.0;
const FONT_SIZE_PT: f32 = 12.0;

const SIGNATURE_LINE: &str = "Patient Signature: __________________________";

/// A string drawn with its baseline starting at (`x`, `y`), in points from the
/// bottom-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Everything the receipt shows.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptInput<'a> {
    pub patient: &'a PatientInfo,
    pub operation: &'a str,
    pub selection: &'a EquipmentSelection,
    pub summary: &'a CostSummary,
    pub currency: &'a str,
}

/// Positioned text for a single-page receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptLayout {
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub lines: Vec<TextLine>,
}

/// Renders an amount without trailing zeros, followed by the currency label.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{} {}", amount.normalize(), currency)
}

impl ReceiptLayout {
    /// Lays out the receipt.
    ///
    /// Patient details sit in the top-right block; the scheme, operation,
    /// itemised equipment (quantities above zero only), totals and signature line
    /// run down the left margin, one line every 20 pt.
    pub fn build(input: &ReceiptInput<'_>) -> Self {
        let x = MARGIN_PT;
        let top = A4_HEIGHT_PT - MARGIN_PT;
        let mut lines = Vec::new();
        let mut push = |x: f32, y: f32, text: String| lines.push(TextLine { x, y, text });

        let header_x = x + HEADER_INDENT_PT;
        push(header_x, top, format!("Name: {}", input.patient.full_name()));
        push(
            header_x,
            top - LINE_STEP_PT,
            format!("HN: {}", input.patient.record_id),
        );
        push(
            header_x,
            top - 2.0 * LINE_STEP_PT,
            format!("Diagnosis: {}", input.patient.diagnosis),
        );

        push(
            x,
            top - 4.0 * LINE_STEP_PT,
            format!("Healthcare Scheme: {}", input.patient.scheme.label()),
        );
        push(
            x,
            top - 5.0 * LINE_STEP_PT,
            format!("Operation: {}", input.operation),
        );
        push(x, top - 7.0 * LINE_STEP_PT, "Equipment Used:".to_string());

        let mut y = top - 8.0 * LINE_STEP_PT;
        for item in input.selection.used() {
            push(
                x + ITEM_INDENT_PT,
                y,
                format!("{}: {}", item.name, item.quantity),
            );
            y -= LINE_STEP_PT;
        }

        let summary = input.summary;
        y -= LINE_STEP_PT;
        push(
            x,
            y,
            format!(
                "Total Cost: {}",
                format_amount(summary.total_cost, input.currency)
            ),
        );
        y -= LINE_STEP_PT;
        push(
            x,
            y,
            format!(
                "Total Reimbursement: {}",
                format_amount(summary.total_reimbursement, input.currency)
            ),
        );
        y -= LINE_STEP_PT;
        push(
            x,
            y,
            format!(
                "Out-of-pocket: {}",
                format_amount(summary.out_of_pocket, input.currency)
            ),
        );
        y -= 2.0 * LINE_STEP_PT;
        push(x, y, SIGNATURE_LINE.to_string());

        Self {
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
            font_size: FONT_SIZE_PT,
            lines,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::Scheme;

    fn patient() -> PatientInfo {
        PatientInfo {
            first_name: "Somchai".into(),
            last_name: "Jaidee".into(),
            record_id: "HN-0042".into(),
            diagnosis: "Left ICA aneurysm".into(),
            scheme: Scheme::SocialSecurity,
        }
    }

    fn summary() -> CostSummary {
        CostSummary {
            total_cost: Decimal::new(1550000, 2),
            total_reimbursement: Decimal::from(9000),
            out_of_pocket: Decimal::new(650000, 2),
            ..Default::default()
        }
    }

    #[test]
    fn lays_out_header_items_totals_and_signature() {
        let patient = patient();
        let summary = summary();
        let selection =
            EquipmentSelection::from_quantities([("Angiogram", 1), ("Coil", 0), ("Rhya", 2)]);
        let layout = ReceiptLayout::build(&ReceiptInput {
            patient: &patient,
            operation: "Diagnostic angiogram",
            selection: &selection,
            summary: &summary,
            currency: "THB",
        });

        let texts: Vec<_> = layout.texts().collect();
        assert_eq!(
            texts,
            [
                "Name: Somchai Jaidee",
                "HN: HN-0042",
                "Diagnosis: Left ICA aneurysm",
                "Healthcare Scheme: Social Security",
                "Operation: Diagnostic angiogram",
                "Equipment Used:",
                "Angiogram: 1",
                "Rhya: 2",
                "Total Cost: 15500 THB",
                "Total Reimbursement: 9000 THB",
                "Out-of-pocket: 6500 THB",
                "Patient Signature: __________________________",
            ]
        );

        let top = A4_HEIGHT_PT - 50.0;
        let positions: Vec<_> = layout.lines.iter().map(|l| (l.x, top - l.y)).collect();
        assert_eq!(
            positions,
            [
                (350.0, 0.0),
                (350.0, 20.0),
                (350.0, 40.0),
                (50.0, 80.0),
                (50.0, 100.0),
                (50.0, 140.0),
                (70.0, 160.0),
                (70.0, 180.0),
                (50.0, 220.0),
                (50.0, 240.0),
                (50.0, 260.0),
                (50.0, 300.0),
            ]
        );
    }

    #[test]
    fn blank_patient_fields_render_as_empty_values() {
        let patient = PatientInfo::default();
        let summary = CostSummary::default();
        let selection = EquipmentSelection::new();
        let layout = ReceiptLayout::build(&ReceiptInput {
            patient: &patient,
            operation: "",
            selection: &selection,
            summary: &summary,
            currency: "THB",
        });

        let texts: Vec<_> = layout.texts().collect();
        assert_eq!(texts[0], "Name:  ");
        assert_eq!(texts[1], "HN: ");
        assert_eq!(texts[4], "Operation: ");
        assert_eq!(texts[6], "Total Cost: 0 THB");
    }

    #[test]
    fn geometry_depends_only_on_item_count() {
        let summary = summary();
        let selection = EquipmentSelection::from_quantities([("Coil", 3)]);
        let build = |patient: &PatientInfo| {
            ReceiptLayout::build(&ReceiptInput {
                patient,
                operation: "x",
                selection: &selection,
                summary: &summary,
                currency: "THB",
            })
        };

        let first = build(&patient());
        let second = build(&PatientInfo {
            first_name: "Another".into(),
            ..patient()
        });
        let coords = |l: &ReceiptLayout| l.lines.iter().map(|t| (t.x, t.y)).collect::<Vec<_>>();
        assert_eq!(coords(&first), coords(&second));
        assert_eq!(first, build(&patient()));
    }
}
