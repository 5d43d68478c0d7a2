//! Plain-text rendering of listings and cost summaries.

use cathlab_core::receipt::format_amount;
use cathlab_core::{CostSummary, ProcedureBook, ReferenceData, Scheme};
use std::io::{self, Write};

pub fn write_schemes(out: &mut impl Write) -> io::Result<()> {
    for scheme in Scheme::ALL {
        writeln!(out, "{}  {}", scheme.code(), scheme.label())?;
    }
    Ok(())
}

pub fn write_catalog(out: &mut impl Write, reference: &ReferenceData) -> io::Result<()> {
    write!(out, "{:<24} {:>10}", "Equipment", "Cost")?;
    for scheme in Scheme::ALL {
        write!(out, " {:>10}", scheme.code())?;
    }
    writeln!(out)?;

    for entry in reference.catalog.entries() {
        let marker = if reference.procedures.is_limited(entry.name()) {
            " (0/1)"
        } else {
            ""
        };
        write!(
            out,
            "{:<24} {:>10}",
            format!("{}{}", entry.name(), marker),
            entry.unit_cost().normalize()
        )?;
        for scheme in Scheme::ALL {
            write!(out, " {:>10}", entry.rate(scheme).normalize())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_operations(out: &mut impl Write, procedures: &ProcedureBook) -> io::Result<()> {
    for preset in procedures.operations() {
        writeln!(out, "{}", preset.name)?;
        for (item, quantity) in &preset.equipment {
            writeln!(out, "    {item}: {quantity}")?;
        }
    }
    Ok(())
}

pub fn write_summary(out: &mut impl Write, summary: &CostSummary, currency: &str) -> io::Result<()> {
    for line in &summary.lines {
        writeln!(
            out,
            "{} x{}  {}  (reimbursed {})",
            line.name,
            line.quantity,
            format_amount(line.cost, currency),
            format_amount(line.reimbursement, currency)
        )?;
    }
    for name in &summary.unmatched {
        writeln!(out, "{name}: not in catalog, not priced")?;
    }
    writeln!(
        out,
        "Total Cost: {}",
        format_amount(summary.total_cost, currency)
    )?;
    writeln!(
        out,
        "Total Reimbursement: {}",
        format_amount(summary.total_reimbursement, currency)
    )?;
    writeln!(
        out,
        "Out-of-pocket: {}",
        format_amount(summary.out_of_pocket, currency)
    )
}
