//! FSIS food recall lookup and PDF text extraction
//!
//! Two independent pieces live here: a blocking GET against the FSIS recall
//! API ([`RecallQuery`]) and a PDF-to-text converter ([`PdfTextExtractor`])
//! that decodes font encodings and orders text the way it is drawn.

mod encodings;
mod error;
mod extract;
mod fonts;
mod output;
mod processor;
mod recall;
mod types;
mod utils;

// Re-export error types
pub use error::{ExtractError, LookupError};

// Re-export extraction API
pub use extract::{
    PdfTextExtractor, PdfTextExtractorBuilder, convert, from_bytes, from_path, from_reader,
};

// Re-export recall API
pub use recall::{
    BROWSER_USER_AGENT, DEFAULT_STATE_ID, RECALL_ENDPOINT, RecallQuery, RecallQueryBuilder,
    fetch_recalls,
};

// Re-export public types
pub use types::{ConversionSummary, ExtractedText, RecallResponse};
