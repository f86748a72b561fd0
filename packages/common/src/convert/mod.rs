//! Format conversions between stored documents, their editable form and PDF.

mod docx;
mod editable;
mod error;
mod pdf;

pub use editable::{Block, EditableDocument, Inline, Section};
pub use error::ConversionError;
pub use pdf::PdfRenderer;

/// Source formats that have an editable form.
pub const EDITABLE_FORMATS: &[&str] = &["docx", "txt"];

/// Source formats that can be rendered to PDF.
pub const PDF_SOURCE_FORMATS: &[&str] = &["docx"];

/// Stateless format transforms plus the external PDF renderer.
///
/// Formats are identified by their short code (`docx`, `txt`, ...), matched
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    renderer: PdfRenderer,
}

impl ConversionPipeline {
    pub fn new(renderer: PdfRenderer) -> Self {
        Self { renderer }
    }

    pub fn supports_editable(format: &str) -> bool {
        EDITABLE_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format))
    }

    pub fn supports_pdf(format: &str) -> bool {
        PDF_SOURCE_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format))
    }

    /// Decode a stored document into its editable form.
    pub fn to_editable_form(
        &self,
        bytes: &[u8],
        source_format: &str,
    ) -> Result<EditableDocument, ConversionError> {
        match source_format.to_ascii_lowercase().as_str() {
            "docx" => Ok(EditableDocument::from_paragraphs(docx::read_paragraphs(
                bytes,
            )?)),
            "txt" => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| ConversionError::Malformed(format!("text is not UTF-8: {e}")))?;
                Ok(EditableDocument::from_paragraphs(
                    text.lines().map(str::to_string),
                ))
            }
            _ => Err(ConversionError::unsupported("editable form", source_format)),
        }
    }

    /// Encode an editable form back into document bytes of `target_format`.
    pub fn from_editable_form(
        &self,
        document: &EditableDocument,
        target_format: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let paragraphs = document.paragraphs();
        match target_format.to_ascii_lowercase().as_str() {
            "docx" => docx::write_paragraphs(&paragraphs),
            "txt" => Ok(paragraphs.join("\n").into_bytes()),
            _ => Err(ConversionError::unsupported("editable form", target_format)),
        }
    }

    /// Render a document to PDF through the external renderer.
    pub async fn to_pdf(
        &self,
        bytes: &[u8],
        source_format: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        if !Self::supports_pdf(source_format) {
            return Err(ConversionError::unsupported("PDF rendering", source_format));
        }
        self.renderer.render_docx(bytes).await
    }
}
