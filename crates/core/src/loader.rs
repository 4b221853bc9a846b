//! Document upload validation
//!
//! Rendering and pagination belong to the external document engine. This
//! module only gates which files may become the session's document and keeps
//! the reference the rest of the session needs.

use crate::config::TakeoffConfig;
use crate::error::{TakeoffError, TakeoffResult};

/// A file handed over by the upload widget or a drop event
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// The document a session is annotating
///
/// Page count is not known here; the renderer reports it once parsing ends.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl LoadedDocument {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Raw file contents for the rendering engine
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Check the upload's MIME type and take ownership of its contents
pub fn validate_upload(upload: DocumentUpload, config: &TakeoffConfig) -> TakeoffResult<LoadedDocument> {
    if !config.accepts_mime_type(&upload.mime_type) {
        log::warn!(
            "rejected upload {:?} with type {:?}",
            upload.file_name,
            upload.mime_type
        );
        return Err(TakeoffError::UnsupportedFileType(upload.mime_type));
    }

    Ok(LoadedDocument {
        file_name: upload.file_name,
        bytes: upload.bytes,
    })
}

/// Take the first file of a multi-file drop; the rest are ignored
pub fn first_upload(files: Vec<DocumentUpload>) -> Option<DocumentUpload> {
    files.into_iter().next()
}
