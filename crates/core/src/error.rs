//! Error types for session operations
//!
//! Every error is terminal for the single user action that raised it. The
//! session stays usable afterwards.

use crate::annotation::AnnotationId;
use crate::symbol::SymbolId;

/// Errors raised by [`crate::store::TakeoffSession`] operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TakeoffError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("symbol name is empty")]
    EmptySymbolName,

    #[error("symbol name is {len} characters, maximum is {max}")]
    SymbolNameTooLong { len: usize, max: usize },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(SymbolId),

    #[error("unknown annotation: {0}")]
    UnknownAnnotation(AnnotationId),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },
}

impl TakeoffError {
    /// Text shown to the user in an alert
    pub fn user_message(&self) -> String {
        match self {
            TakeoffError::UnsupportedFileType(_) => "Please upload a PDF file".to_string(),
            TakeoffError::EmptySymbolName => "Please enter a name for the symbol".to_string(),
            TakeoffError::SymbolNameTooLong { max, .. } => {
                format!("Symbol names can be at most {} characters", max)
            }
            other => other.to_string(),
        }
    }
}

pub type TakeoffResult<T> = Result<T, TakeoffError>;
