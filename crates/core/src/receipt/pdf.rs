use super::layout::ReceiptLayout;
use crate::{CathlabError, CathlabResult};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::path::Path;

const DOCUMENT_TITLE: &str = "Procedure cost summary";

/// Font used to draw the receipt.
///
/// The built-in Helvetica only covers Latin text. Names in other scripts need a
/// TrueType font supplied through configuration.
#[derive(Debug, Clone, Default)]
pub enum ReceiptFont {
    #[default]
    Helvetica,
    TrueType(Vec<u8>),
}

impl ReceiptFont {
    /// Reads a TrueType font from `path`, or falls back to Helvetica when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::FontRead`] if the font file cannot be read.
    pub fn load(path: Option<&Path>) -> CathlabResult<Self> {
        match path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(CathlabError::FontRead)?;
                tracing::info!("using receipt font {}", path.display());
                Ok(ReceiptFont::TrueType(bytes))
            }
            None => Ok(ReceiptFont::Helvetica),
        }
    }

    fn register(&self, doc: &PdfDocumentReference) -> CathlabResult<IndirectFontRef> {
        let font = match self {
            ReceiptFont::Helvetica => doc.add_builtin_font(BuiltinFont::Helvetica),
            ReceiptFont::TrueType(bytes) => doc.add_external_font(bytes.as_slice()),
        };
        font.map_err(|e| CathlabError::Pdf(format!("{e:?}")))
    }
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Draws `layout` onto a single page and returns the PDF bytes.
///
/// # Errors
///
/// Returns [`CathlabError::Pdf`] if the font cannot be embedded or the document
/// cannot be serialised.
pub fn render_pdf(layout: &ReceiptLayout, font: &ReceiptFont) -> CathlabResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        DOCUMENT_TITLE,
        mm(layout.width),
        mm(layout.height),
        "Receipt",
    );
    let font = font.register(&doc)?;
    let canvas = doc.get_page(page).get_layer(layer);

    for line in &layout.lines {
        canvas.use_text(
            line.text.clone(),
            layout.font_size,
            mm(line.x),
            mm(line.y),
            &font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| CathlabError::Pdf(format!("{e:?}")))
}
