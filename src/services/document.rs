// Document Text Source
// Turns uploaded file bytes into one text string for the check pipeline

use std::path::Path;
use tracing::{info, warn};

use crate::services::text_processor::normalize_whitespace;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let is_pdf = Path::new(file_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            Self::Pdf
        } else {
            Self::PlainText
        }
    }
}

/// Extract the text of a document. Fails when nothing readable remains.
pub fn extract_document_text(file_name: &str, bytes: &[u8]) -> Result<String, String> {
    let kind = DocumentKind::from_file_name(file_name);
    let raw = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            warn!("[DOCUMENT] pdf extraction failed for {}: {}", file_name, e);
            format!("Failed to read PDF: {}", e)
        })?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(format!("No readable text found in {}", file_name));
    }

    info!(
        "[DOCUMENT] {} ({:?}) -> {} chars from {} bytes",
        file_name,
        kind,
        text.chars().count(),
        bytes.len()
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_file_name("paper.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("notes.txt"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_file_name("README"), DocumentKind::PlainText);
    }

    #[test]
    fn test_plain_text_is_normalized() {
        let text = extract_document_text("essay.txt", b"The sky\n\nis blue.  Cats are mammals.\r\n").unwrap();
        assert_eq!(text, "The sky is blue. Cats are mammals.");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let text = extract_document_text("essay.md", &[b'O', b'k', 0xFF, b'!']).unwrap();
        assert!(text.starts_with("Ok"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let err = extract_document_text("blank.txt", b"  \n\t ").unwrap_err();
        assert!(err.contains("blank.txt"));
    }
}
