//! Interactive terminal wizard.
//!
//! Walks a [`Session`] through its five screens. Every screen ends with a
//! navigation prompt: `n` for next, `p` for previous, `q` to quit. On the receipt
//! screen `e` exports the PDF. Pressing Enter on a field keeps its current value,
//! so going back to correct one field does not mean retyping the others. A lone
//! `-` clears the field. The operation prompt offers the first preset until one
//! is chosen.

use crate::output::write_summary;
use anyhow::Result;
use cathlab_core::{OperationChoice, PatientInfo, ReceiptFont, Scheme, Session, WizardStep};
use std::io::{BufRead, Write};

/// How a wizard run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Receipt rendered on the export screen.
    Exported(Vec<u8>),
    /// The user quit or input ran out.
    Abandoned,
}

const CLEAR: &str = "-";

enum Nav {
    Next,
    Previous,
    Export,
    Quit,
}

pub struct Wizard<'a, R, W> {
    input: R,
    out: W,
    currency: &'a str,
    font: &'a ReceiptFont,
}

impl<'a, R: BufRead, W: Write> Wizard<'a, R, W> {
    pub fn new(input: R, out: W, currency: &'a str, font: &'a ReceiptFont) -> Self {
        Self {
            input,
            out,
            currency,
            font,
        }
    }

    /// Runs the wizard until the receipt is exported or the user gives up.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails, or if the
    /// receipt cannot be rendered.
    pub fn run(&mut self, session: &mut Session) -> Result<Outcome> {
        loop {
            let step = session.step();
            writeln!(
                self.out,
                "\n== Step {} of {}: {} ==",
                step.index() + 1,
                WizardStep::ALL.len(),
                step
            )?;

            let filled = match step {
                WizardStep::PatientInfo => self.patient_screen(session)?,
                WizardStep::OperationSelect => self.operation_screen(session)?,
                WizardStep::EquipmentSelect => self.equipment_screen(session)?,
                WizardStep::CostSummary => {
                    let summary = session.summary().cloned().unwrap_or_default();
                    write_summary(&mut self.out, &summary, self.currency)?;
                    true
                }
                WizardStep::ReceiptExport => {
                    writeln!(self.out, "Ready to export the receipt.")?;
                    true
                }
            };
            if !filled {
                return Ok(Outcome::Abandoned);
            }

            match self.navigation(step)? {
                Nav::Next => {
                    if let Err(e) = session.next() {
                        writeln!(self.out, "{e}")?;
                    }
                }
                Nav::Previous => {
                    if let Err(e) = session.previous() {
                        writeln!(self.out, "{e}")?;
                    }
                }
                Nav::Export => {
                    let pdf = session.render_receipt(self.currency, self.font)?;
                    return Ok(Outcome::Exported(pdf));
                }
                Nav::Quit => return Ok(Outcome::Abandoned),
            }
        }
    }

    /// Prompts and reads one trimmed-of-newline line. `None` at end of input.
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like [`Wizard::ask`] but keeps `current` when the answer is empty and
    /// clears it when the answer is [`CLEAR`].
    fn ask_keep(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        let answer = self.ask(&format!("{label} [{current}]"))?;
        Ok(answer.map(|a| match a.as_str() {
            "" => current.to_string(),
            CLEAR => String::new(),
            _ => a,
        }))
    }

    fn navigation(&mut self, step: WizardStep) -> Result<Nav> {
        let prompt = if step == WizardStep::ReceiptExport {
            "(e)xport, (p)revious, (q)uit"
        } else {
            "(n)ext, (p)revious, (q)uit"
        };
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(Nav::Quit);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "n" if step != WizardStep::ReceiptExport => return Ok(Nav::Next),
                "e" if step == WizardStep::ReceiptExport => return Ok(Nav::Export),
                "p" => return Ok(Nav::Previous),
                "q" => return Ok(Nav::Quit),
                other => writeln!(self.out, "unrecognised choice '{other}'")?,
            }
        }
    }

    fn patient_screen(&mut self, session: &mut Session) -> Result<bool> {
        let current = session.patient().clone();

        let Some(first_name) = self.ask_keep("First name", &current.first_name)? else {
            return Ok(false);
        };
        let Some(last_name) = self.ask_keep("Last name", &current.last_name)? else {
            return Ok(false);
        };
        let Some(record_id) = self.ask_keep("HN", &current.record_id)? else {
            return Ok(false);
        };
        let Some(diagnosis) = self.ask_keep("Diagnosis", &current.diagnosis)? else {
            return Ok(false);
        };

        for scheme in Scheme::ALL {
            writeln!(self.out, "  {}  {}", scheme.code(), scheme.label())?;
        }
        let scheme = loop {
            let Some(answer) = self.ask_keep("Healthcare scheme", current.scheme.code())? else {
                return Ok(false);
            };
            match Scheme::parse(&answer) {
                Ok(scheme) => break scheme,
                Err(e) => writeln!(self.out, "{e}")?,
            }
        };

        session.submit_patient(PatientInfo {
            first_name,
            last_name,
            record_id,
            diagnosis,
            scheme,
        })?;
        Ok(true)
    }

    fn operation_screen(&mut self, session: &mut Session) -> Result<bool> {
        let presets: Vec<String> = session
            .reference()
            .procedures
            .operations()
            .iter()
            .map(|p| p.name.to_string())
            .collect();
        for (i, name) in presets.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, name)?;
        }
        writeln!(self.out, "  c. Other (type a name)")?;

        loop {
            let current = session.operation_name().to_string();
            let offered = if current.is_empty() {
                presets.first().cloned().unwrap_or_default()
            } else {
                current.clone()
            };
            let Some(answer) = self.ask_keep("Operation", &offered)? else {
                return Ok(false);
            };
            let answer = answer.trim();

            let choice = if answer.eq_ignore_ascii_case("c") {
                let Some(name) = self.ask("Enter operation name")? else {
                    return Ok(false);
                };
                OperationChoice::Custom { name }
            } else if let Some(name) = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| presets.get(i))
            {
                session.reference().procedures.choose(name)
            } else if !current.is_empty() && answer == current {
                return Ok(true);
            } else {
                session.reference().procedures.choose(answer)
            };

            match session.choose_operation(choice) {
                Ok(()) => return Ok(true),
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
    }

    fn equipment_screen(&mut self, session: &mut Session) -> Result<bool> {
        loop {
            let rows: Vec<(String, u32)> = session
                .selection()
                .iter()
                .map(|item| (item.name.clone(), item.quantity))
                .collect();
            for (i, (name, quantity)) in rows.iter().enumerate() {
                let marker = if session.reference().procedures.is_limited(name) {
                    " (0/1)"
                } else {
                    ""
                };
                writeln!(self.out, "  {:>2}. {}{}: {}", i + 1, name, marker, quantity)?;
            }

            let Some(answer) = self.ask("Change '<number> <quantity>' (Enter when done)")? else {
                return Ok(false);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(true);
            }

            let parsed = answer.split_once(char::is_whitespace).and_then(|(n, q)| {
                let index = n.parse::<usize>().ok()?.checked_sub(1)?;
                let quantity = q.trim().parse::<u32>().ok()?;
                Some((rows.get(index)?.0.clone(), quantity))
            });
            match parsed {
                Some((name, quantity)) => {
                    if let Err(e) = session.set_quantity(&name, quantity) {
                        writeln!(self.out, "{e}")?;
                    }
                }
                None => writeln!(self.out, "expected a row number and a quantity")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cathlab_core::{EquipmentCatalog, ProcedureBook, ReferenceData};
    use std::io::Cursor;
    use std::sync::Arc;

    fn reference() -> Arc<ReferenceData> {
        let catalog = EquipmentCatalog::from_reader(
            "equipment,Cost,Universal healthcare,UCEP,Social Security,Civil Service,Self pay\n\
             Angiogram,1000,800,1200,900,1000,\n\
             Contrast media,100,50,100,80,100,\n\
             Fubuki,500,300,400,350,500,\n"
                .as_bytes(),
        )
        .expect("catalog");
        let procedures = ProcedureBook::from_yaml_str(
            "limited_items: [Fubuki]\n\
             operations:\n\
             \x20 - name: Angio\n\
             \x20   equipment: {Angiogram: 1, Contrast media: 4}\n",
        )
        .expect("procedures");
        Arc::new(ReferenceData::new(catalog, procedures))
    }

    fn run(script: &str) -> (Session, Outcome, String) {
        let mut session = Session::new(reference());
        let mut out = Vec::new();
        let font = ReceiptFont::Helvetica;
        let outcome = Wizard::new(Cursor::new(script.to_string()), &mut out, "THB", &font)
            .run(&mut session)
            .expect("wizard");
        (session, outcome, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn full_run_exports_a_receipt() {
        let script = "Somchai\nJaidee\nHN-1\nAVM\nA\nn\n1\nn\n3 1\n\nn\nn\ne\n";
        let (session, outcome, text) = run(script);

        assert!(matches!(outcome, Outcome::Exported(ref pdf) if pdf.starts_with(b"%PDF-")));
        assert_eq!(session.patient().first_name, "Somchai");
        assert_eq!(session.operation_name(), "Angio");
        assert_eq!(session.selection().quantity("Contrast media"), 4);
        assert_eq!(session.selection().quantity("Fubuki"), 1);
        assert!(text.contains("Total Cost: 1900 THB"));
        assert!(text.contains("Out-of-pocket: 600 THB"));
    }

    #[test]
    fn limited_item_above_one_is_refused() {
        let script = "\n\n\n\n\nn\n1\nn\n3 2\n\nq\n";
        let (session, outcome, text) = run(script);

        assert!(matches!(outcome, Outcome::Abandoned));
        assert_eq!(session.selection().quantity("Fubuki"), 0);
        assert!(text.contains("'Fubuki' is limited to 0 or 1, got 2"));
    }

    #[test]
    fn going_back_keeps_earlier_answers() {
        let script = "Ann\nLee\n\n\nB\nn\n1\np\n\n\n\n\n\nn\n\nn\n";
        let (session, outcome, _) = run(script);

        assert!(matches!(outcome, Outcome::Abandoned));
        assert_eq!(session.patient().first_name, "Ann");
        assert_eq!(session.patient().scheme, Scheme::Ucep);
        assert_eq!(session.operation_name(), "Angio");
        assert_eq!(session.step(), WizardStep::EquipmentSelect);
    }

    #[test]
    fn dash_clears_a_patient_field() {
        let script = "Ann\nLee\nHN-9\nAVM\nB\nn\n1\np\n-\n\n-\n\n\nn\n";
        let (session, outcome, _) = run(script);

        assert!(matches!(outcome, Outcome::Abandoned));
        let patient = session.patient();
        assert_eq!(patient.first_name, "");
        assert_eq!(patient.last_name, "Lee");
        assert_eq!(patient.record_id, "");
        assert_eq!(patient.diagnosis, "AVM");
        assert_eq!(patient.scheme, Scheme::Ucep);
        assert_eq!(session.step(), WizardStep::OperationSelect);
    }

    #[test]
    fn enter_on_operation_takes_the_first_preset() {
        let script = "\n\n\n\n\nn\n\nn\n";
        let (session, outcome, text) = run(script);

        assert!(matches!(outcome, Outcome::Abandoned));
        assert!(text.contains("Operation [Angio]"));
        assert_eq!(session.operation_name(), "Angio");
        assert_eq!(session.step(), WizardStep::EquipmentSelect);
        assert_eq!(session.selection().quantity("Contrast media"), 4);
    }

    #[test]
    fn previous_on_first_screen_is_reported() {
        let script = "\n\n\n\n\np\n";
        let (session, outcome, text) = run(script);

        assert!(matches!(outcome, Outcome::Abandoned));
        assert_eq!(session.step(), WizardStep::PatientInfo);
        assert!(text.contains("there is no step before Patient Information"));
    }

    #[test]
    fn custom_operation_and_bad_scheme_retry() {
        let script = "\n\n\n\nZ\nD\nn\nc\nCarotid stent\nn\n";
        let (session, _, text) = run(script);

        assert!(text.contains("unknown healthcare scheme 'Z'"));
        assert_eq!(session.patient().scheme, Scheme::CivilService);
        assert_eq!(session.operation_name(), "Carotid stent");
        assert_eq!(session.selection().used().count(), 0);
    }
}
