//! Receipt rendering.
//!
//! Rendering happens in two stages so the geometry can be checked without
//! parsing PDF output:
//!
//! 1. [`ReceiptLayout::build`] positions every text line on an A4 page.
//! 2. [`render_pdf`] draws a layout into PDF bytes.

mod layout;
mod pdf;

pub use layout::{format_amount, ReceiptInput, ReceiptLayout, TextLine, A4_HEIGHT_PT, A4_WIDTH_PT};
pub use pdf::{render_pdf, ReceiptFont};
