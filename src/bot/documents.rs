//! Text extraction from uploaded documents.

use super::docx;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Classify by MIME type, falling back to the file extension.
    pub fn detect(mime_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        match mime_type {
            Some(PDF_MIME) => return Some(DocumentKind::Pdf),
            Some(DOCX_MIME) => return Some(DocumentKind::Docx),
            _ => {}
        }
        let ext = file_name?.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// `max_bytes` bounds the decompressed document text of a DOCX.
pub fn extract_text(kind: DocumentKind, data: &[u8], max_bytes: u64) -> Result<String, String> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| format!("Failed to read PDF: {e}")),
        DocumentKind::Docx => docx::extract_text(data, max_bytes),
    }
}
