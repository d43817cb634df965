//! services/api/src/adapters/extract.rs
//!
//! Turns uploaded bytes into plain text. Implements the `TextExtractionService`
//! port; PDFs go through `pdf-extract` on the blocking pool.

use async_trait::async_trait;
use study_companion_core::domain::MediaType;
use study_companion_core::ports::{PortError, PortResult, TextExtractionService};
use tracing::warn;

pub const PARSE_FAILURE: &str =
    "Failed to parse the document. It might be corrupted or in an unsupported format.";

#[derive(Clone, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractionService for DocumentExtractor {
    async fn extract_text(&self, bytes: &[u8], media_type: MediaType) -> PortResult<String> {
        match media_type {
            MediaType::PlainText => extract_plain_text(bytes),
            MediaType::Pdf => {
                let bytes = bytes.to_vec();
                // pdf-extract may panic on malformed input; a panicked task is a parse failure.
                tokio::task::spawn_blocking(move || extract_pdf(&bytes))
                    .await
                    .map_err(|e| {
                        warn!("PDF extraction task failed: {}", e);
                        PortError::ExtractionFailed(PARSE_FAILURE.to_string())
                    })?
            }
        }
    }
}

fn extract_plain_text(bytes: &[u8]) -> PortResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        warn!("Uploaded text file is not valid UTF-8: {}", e);
        PortError::ExtractionFailed(PARSE_FAILURE.to_string())
    })
}

/// Extracts every page and joins them in page order.
pub fn extract_pdf(bytes: &[u8]) -> PortResult<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        warn!("PDF extraction failed: {}", e);
        PortError::ExtractionFailed(PARSE_FAILURE.to_string())
    })?;
    Ok(join_pages(pages))
}

/// Joins page texts with a single newline between consecutive pages.
pub fn join_pages(pages: Vec<String>) -> String {
    pages.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_is_returned_verbatim() {
        let text = DocumentExtractor::new()
            .extract_text("Ünïcode notes\n\nline two".as_bytes(), MediaType::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "Ünïcode notes\n\nline two");
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_parse_failure() {
        let err = DocumentExtractor::new()
            .extract_text(&[0xff, 0xfe, 0x00], MediaType::PlainText)
            .await
            .unwrap_err();
        assert_eq!(err, PortError::ExtractionFailed(PARSE_FAILURE.to_string()));
    }

    #[tokio::test]
    async fn invalid_pdf_is_a_parse_failure() {
        let err = DocumentExtractor::new()
            .extract_text(b"not a pdf", MediaType::Pdf)
            .await
            .unwrap_err();
        assert_eq!(err, PortError::ExtractionFailed(PARSE_FAILURE.to_string()));
    }

    /// A minimal two-page PDF using the standard Helvetica font, one line of text per page.
    fn two_page_pdf() -> Vec<u8> {
        let page = |contents: usize| {
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 7 0 R >> >> /Contents {} 0 R >>",
                contents
            )
        };
        let text_stream = |text: &str| {
            let ops = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            format!("<< /Length {} >>\nstream\n{}\nendstream", ops.len(), ops)
        };
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>".to_string(),
            page(4),
            text_stream("First page"),
            page(6),
            text_stream("Second page"),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    #[tokio::test]
    async fn pdf_pages_are_extracted_in_order() {
        let text = DocumentExtractor::new()
            .extract_text(&two_page_pdf(), MediaType::Pdf)
            .await
            .unwrap();

        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
        assert!(text[first..second].contains('\n'));
    }

    #[test]
    fn pages_are_joined_in_order() {
        let joined = join_pages(vec!["first".into(), "second".into(), "third".into()]);
        assert_eq!(joined, "first\nsecond\nthird");
    }
}
