//! PDF text extraction for the PdfUpload input mode.
//!
//! Wraps the `pdf-extract` crate. Extraction is CPU-bound and the crate can
//! panic on malformed input, so it runs on the blocking pool and a panic is
//! reported as an unreadable document.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::ServiceError;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// The header may be preceded by junk bytes; readers scan the first KiB.
const HEADER_SCAN_BYTES: usize = 1024;
const ENCRYPT_MARKER: &[u8] = b"/Encrypt";

/// Returns the document text in page order.
///
/// Image-only documents produce empty text; normalization rejects that as
/// empty input.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, ServiceError> {
    if !has_pdf_header(&bytes) {
        return Err(ServiceError::UnreadableDocument);
    }

    let encrypted = has_encrypt_dictionary(&bytes);
    let size = bytes.len();

    let outcome = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map(|pages| join_pages(&pages))
            .map_err(|e| format!("{e:?}"))
    })
    .await;

    match outcome {
        Ok(Ok(text)) => {
            if encrypted && text.trim().is_empty() {
                return Err(ServiceError::EncryptedDocument);
            }
            debug!("Extracted {} chars from {size}-byte PDF", text.len());
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            if encrypted || e.to_lowercase().contains("encrypt") {
                Err(ServiceError::EncryptedDocument)
            } else {
                Err(ServiceError::UnreadableDocument)
            }
        }
        Err(join_error) => {
            warn!("PDF extraction aborted: {join_error}");
            if encrypted {
                Err(ServiceError::EncryptedDocument)
            } else {
                Err(ServiceError::UnreadableDocument)
            }
        }
    }
}

/// Each page ends with a newline so words never run across a page break.
fn join_pages(pages: &[String]) -> String {
    pages.iter().fold(String::new(), |mut text, page| {
        text.push_str(page);
        text.push('\n');
        text
    })
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SCAN_BYTES)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

fn has_encrypt_dictionary(bytes: &[u8]) -> bool {
    bytes
        .windows(ENCRYPT_MARKER.len())
        .any(|w| w == ENCRYPT_MARKER)
}
