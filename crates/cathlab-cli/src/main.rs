mod output;
mod wizard;

use anyhow::{anyhow, Context};
use cathlab_core::config::resolve_catalog_path;
use cathlab_core::constants::DEFAULT_SESSION_TTL_MINUTES;
use cathlab_core::{
    calculate, CoreConfig, EquipmentSelection, PatientInfo, ReceiptFont, ReferenceData, Scheme,
    Session, RECEIPT_FILENAME,
};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{Outcome, Wizard};

#[derive(Parser)]
#[command(name = "cathlab")]
#[command(about = "Cath lab procedure cost receipts")]
struct Cli {
    /// Equipment catalog CSV
    #[arg(long, global = true, env = "CATHLAB_CATALOG_PATH")]
    catalog: Option<PathBuf>,
    /// Procedure book YAML (built-in presets if omitted)
    #[arg(long, global = true, env = "CATHLAB_PROCEDURES_PATH")]
    procedures: Option<PathBuf>,
    /// Currency label printed after amounts
    #[arg(long, global = true, env = "CATHLAB_CURRENCY", default_value = cathlab_core::DEFAULT_CURRENCY)]
    currency: String,
    /// TrueType font for receipts (Helvetica if omitted)
    #[arg(long, global = true, env = "CATHLAB_RECEIPT_FONT")]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List healthcare schemes
    Schemes,
    /// List the equipment catalog
    Catalog,
    /// List operation presets and their default equipment
    Operations,
    /// Price a selection
    Quote {
        /// Scheme code or label
        #[arg(long, default_value = "A")]
        scheme: String,
        /// Start from this operation's default equipment
        #[arg(long)]
        operation: Option<String>,
        /// Equipment quantity as NAME=QTY (repeatable)
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<(String, u32)>,
    },
    /// Render a receipt without the interactive wizard
    Receipt {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Hospital number
        #[arg(long, default_value = "")]
        hn: String,
        #[arg(long, default_value = "")]
        diagnosis: String,
        /// Scheme code or label
        #[arg(long, default_value = "A")]
        scheme: String,
        /// Preset name, or any other text for a custom operation
        #[arg(long, default_value = "")]
        operation: String,
        /// Equipment quantity as NAME=QTY (repeatable)
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<(String, u32)>,
        /// Where to write the PDF
        #[arg(long, default_value = RECEIPT_FILENAME)]
        output: PathBuf,
    },
    /// Fill in the five-step form interactively
    Wizard {
        /// Where to write the PDF
        #[arg(long, default_value = RECEIPT_FILENAME)]
        output: PathBuf,
    },
}

fn parse_item(value: &str) -> Result<(String, u32), String> {
    let (name, quantity) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{value}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing equipment name in '{value}'"));
    }
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("quantity must be a whole number, got '{}'", quantity.trim()))?;
    Ok((name.to_string(), quantity))
}

impl Cli {
    fn config(&self) -> anyhow::Result<CoreConfig> {
        Ok(CoreConfig::new(
            resolve_catalog_path(self.catalog.clone())?,
            self.procedures.clone(),
            self.currency.clone(),
            self.font.clone(),
            DEFAULT_SESSION_TTL_MINUTES,
        )?)
    }
}

fn save_pdf(path: &Path, pdf: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, pdf).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), pdf.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cathlab_cli=info".parse()?)
                .add_directive("cathlab_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        None => println!("Use 'cathlab --help' for commands"),
        Some(Commands::Schemes) => output::write_schemes(&mut io::stdout().lock())?,
        Some(command) => {
            let cfg = cli.config()?;
            let reference = Arc::new(ReferenceData::load(&cfg)?);
            run(command, &cfg, reference)?;
        }
    }

    Ok(())
}

fn run(command: &Commands, cfg: &CoreConfig, reference: Arc<ReferenceData>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Schemes => output::write_schemes(&mut stdout)?,
        Commands::Catalog => output::write_catalog(&mut stdout, &reference)?,
        Commands::Operations => output::write_operations(&mut stdout, &reference.procedures)?,
        Commands::Quote {
            scheme,
            operation,
            items,
        } => {
            let scheme = Scheme::parse(scheme)?;
            let preset = operation
                .as_deref()
                .map(|name| {
                    reference
                        .procedures
                        .preset(name)
                        .ok_or_else(|| anyhow!("unknown operation '{name}'"))
                })
                .transpose()?;

            let mut selection = EquipmentSelection::seeded(&reference.catalog, preset);
            for (name, quantity) in items {
                selection.set_quantity(name, *quantity, &reference.procedures)?;
            }

            let summary = calculate(&reference.catalog, &selection, scheme);
            output::write_summary(&mut stdout, &summary, cfg.currency())?;
        }
        Commands::Receipt {
            first_name,
            last_name,
            hn,
            diagnosis,
            scheme,
            operation,
            items,
            output,
        } => {
            let mut session = Session::new(reference.clone());
            session.submit_patient(PatientInfo {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                record_id: hn.clone(),
                diagnosis: diagnosis.clone(),
                scheme: Scheme::parse(scheme)?,
            })?;
            session.next()?;
            session.choose_operation(reference.procedures.choose(operation))?;
            session.next()?;
            session.set_quantities(items.iter().map(|(name, q)| (name.as_str(), *q)))?;
            session.next()?;
            session.next()?;

            let font = ReceiptFont::load(cfg.receipt_font())?;
            let pdf = session.render_receipt(cfg.currency(), &font)?;
            save_pdf(output, &pdf)?;
        }
        Commands::Wizard { output } => {
            let font = ReceiptFont::load(cfg.receipt_font())?;
            let mut session = Session::new(reference);
            let outcome = Wizard::new(io::stdin().lock(), &mut stdout, cfg.currency(), &font)
                .run(&mut session)?;
            match outcome {
                Outcome::Exported(pdf) => save_pdf(output, &pdf)?,
                Outcome::Abandoned => writeln!(stdout, "\nNo receipt written.")?,
            }
        }
    }

    Ok(())
}
