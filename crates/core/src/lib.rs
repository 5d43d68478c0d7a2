//! # Cathlab Core
//!
//! Core business logic for the cathlab procedure cost receipt service.
//!
//! This crate contains pure data operations:
//! - Loading the equipment catalog (workbook or CSV) and the procedure book (YAML)
//! - Summing cost and reimbursement for an equipment selection under a scheme
//! - The five-step wizard session
//! - Receipt layout and PDF rendering
//!
//! **No API concerns**: HTTP servers, session storage and terminal prompts belong in
//! `api-rest`, `api-shared` and `cathlab-cli`.

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod procedures;
pub mod receipt;
pub mod reference;
pub mod scheme;
pub mod selection;
pub mod session;

pub use calculator::{calculate, out_of_pocket, CostLine, CostSummary};
pub use catalog::{EquipmentCatalog, EquipmentEntry};
pub use config::CoreConfig;
pub use constants::{DEFAULT_CURRENCY, RECEIPT_FILENAME};
pub use error::{CathlabError, CathlabResult};
pub use patient::PatientInfo;
pub use procedures::{OperationChoice, OperationPreset, ProcedureBook};
pub use receipt::{render_pdf, ReceiptFont, ReceiptInput, ReceiptLayout};
pub use reference::ReferenceData;
pub use scheme::Scheme;
pub use selection::{EquipmentSelection, SelectedItem};
pub use session::{Session, WizardStep};

pub use cathlab_types::NonEmptyText;
