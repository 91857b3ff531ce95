//! Upload intake: decode wire blobs and keep only plausible PDFs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docchat_ai::UploadBlob;
use docchat_config::schema::UploadConfig;

use crate::protocol::{IncomingFile, Rejection};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Batch and per-file limits applied before anything reaches a session.
#[derive(Debug, Clone, Copy)]
pub struct IntakeLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl IntakeLimits {
    pub fn from_config(upload: &UploadConfig) -> Self {
        Self {
            max_files: upload.max_files as usize,
            max_file_bytes: upload.max_file_size_bytes(),
        }
    }

    /// Largest WebSocket message a full batch can produce once base64 encoded.
    pub fn max_message_bytes(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_bytes / 3 * 4 + 4)
            .saturating_add(64 * 1024)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("too many files: {count} (at most {max} per upload)")]
    TooManyFiles { count: usize, max: usize },

    #[error("only PDF files are accepted")]
    NotPdfName,

    #[error("file content is not a PDF")]
    NotPdfContent,

    #[error("invalid base64 data: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("file is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },
}

/// Result of checking one upload batch.
#[derive(Debug, Default)]
pub struct Intake {
    pub blobs: Vec<UploadBlob>,
    pub rejected: Vec<Rejection>,
}

/// Check a batch. Oversized batches fail as a whole; individual bad
/// files are reported in `rejected` and the rest still go through.
pub fn check_batch(
    files: Vec<IncomingFile>,
    limits: &IntakeLimits,
) -> Result<Intake, IntakeError> {
    if files.len() > limits.max_files {
        return Err(IntakeError::TooManyFiles {
            count: files.len(),
            max: limits.max_files,
        });
    }

    let mut intake = Intake::default();
    for file in files {
        match check_file(&file, limits) {
            Ok(bytes) => intake.blobs.push(UploadBlob::new(file.name, bytes)),
            Err(e) => {
                tracing::debug!(file = %file.name, error = %e, "intake rejected file");
                intake.rejected.push(Rejection::new(file.name, e));
            }
        }
    }
    Ok(intake)
}

fn check_file(file: &IncomingFile, limits: &IntakeLimits) -> Result<Vec<u8>, IntakeError> {
    if !has_pdf_extension(&file.name) {
        return Err(IntakeError::NotPdfName);
    }

    // Reject on the encoded length first so huge payloads are never decoded.
    let estimated = file.data.len() / 4 * 3;
    if estimated > limits.max_file_bytes + 2 {
        return Err(IntakeError::TooLarge {
            size: estimated,
            max: limits.max_file_bytes,
        });
    }

    let bytes = STANDARD.decode(file.data.trim())?;
    if bytes.len() > limits.max_file_bytes {
        return Err(IntakeError::TooLarge {
            size: bytes.len(),
            max: limits.max_file_bytes,
        });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(IntakeError::NotPdfContent);
    }
    Ok(bytes)
}

fn has_pdf_extension(name: &str) -> bool {
    name.len() > 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> IntakeLimits {
        IntakeLimits {
            max_files: 3,
            max_file_bytes: 64,
        }
    }

    fn file(name: &str, bytes: &[u8]) -> IncomingFile {
        IncomingFile {
            name: name.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    #[test]
    fn accepts_pdf() {
        let intake = check_batch(vec![file("Report.PDF", b"%PDF-1.4 body")], &limits()).unwrap();
        assert_eq!(intake.blobs.len(), 1);
        assert_eq!(intake.blobs[0].name, "Report.PDF");
        assert_eq!(intake.blobs[0].bytes, b"%PDF-1.4 body");
        assert!(intake.rejected.is_empty());
    }

    #[test]
    fn rejects_wrong_extension() {
        let intake = check_batch(vec![file("notes.txt", b"%PDF-1.4")], &limits()).unwrap();
        assert!(intake.blobs.is_empty());
        assert_eq!(intake.rejected[0].name, "notes.txt");
        assert_eq!(intake.rejected[0].reason, "only PDF files are accepted");
    }

    #[test]
    fn bare_extension_is_not_a_name() {
        assert!(!has_pdf_extension(".pdf"));
        assert!(has_pdf_extension("a.pdf"));
        assert!(!has_pdf_extension("a.pdf.exe"));
    }

    #[test]
    fn rejects_non_pdf_content() {
        let intake = check_batch(vec![file("fake.pdf", b"PK\x03\x04zip")], &limits()).unwrap();
        assert!(intake.blobs.is_empty());
        assert_eq!(intake.rejected[0].reason, "file content is not a PDF");
    }

    #[test]
    fn rejects_bad_base64() {
        let bad = IncomingFile {
            name: "a.pdf".into(),
            data: "***".into(),
        };
        let intake = check_batch(vec![bad], &limits()).unwrap();
        assert!(intake.rejected[0].reason.starts_with("invalid base64"));
    }

    #[test]
    fn rejects_oversized_file() {
        let mut big = b"%PDF-".to_vec();
        big.resize(65, b'x');
        let intake = check_batch(vec![file("big.pdf", &big)], &limits()).unwrap();
        assert!(intake.blobs.is_empty());
        assert!(intake.rejected[0].reason.contains("limit is 64"));

        let mut exact = b"%PDF-".to_vec();
        exact.resize(64, b'x');
        let intake = check_batch(vec![file("exact.pdf", &exact)], &limits()).unwrap();
        assert_eq!(intake.blobs.len(), 1);
    }

    #[test]
    fn bad_files_do_not_block_good_ones() {
        let intake = check_batch(
            vec![
                file("a.pdf", b"%PDF-a"),
                file("b.doc", b"%PDF-b"),
                file("c.pdf", b"%PDF-c"),
            ],
            &limits(),
        )
        .unwrap();
        let names: Vec<_> = intake.blobs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "c.pdf"]);
        assert_eq!(intake.rejected.len(), 1);
    }

    #[test]
    fn too_many_files_fails_the_batch() {
        let files = (0..4).map(|i| file(&format!("{i}.pdf"), b"%PDF-")).collect();
        let err = check_batch(files, &limits()).unwrap_err();
        assert!(matches!(err, IntakeError::TooManyFiles { count: 4, max: 3 }));
    }

    #[test]
    fn message_budget_covers_a_full_batch() {
        let limits = IntakeLimits::from_config(&UploadConfig::default());
        let encoded_file = limits.max_file_bytes / 3 * 4 + 4;
        assert!(limits.max_message_bytes() > limits.max_files * encoded_file);
    }
}
