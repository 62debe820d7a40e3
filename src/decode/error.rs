// src/decode/error.rs

use thiserror::Error;

/// Everything that can go wrong turning one archive file's lines into
/// appointment rows.
///
/// `UnknownRecordType` is recoverable: the line is skipped and surfaced as a
/// warning. Every other variant is fatal to the file it occurred in (and only
/// to that file).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line {ordinal}: unrecognised record discriminator {found:?}")]
    UnknownRecordType { ordinal: usize, found: Option<char> },

    #[error("line {ordinal}: unknown file kind marker {marker:?}")]
    UnknownFileKind { ordinal: usize, marker: String },

    #[error("line {ordinal}: malformed header: {reason}")]
    MalformedHeader { ordinal: usize, reason: String },

    #[error("line {ordinal}: malformed trailer: {reason}")]
    MalformedTrailer { ordinal: usize, reason: String },

    #[error("line {ordinal}: malformed company record: {reason}")]
    MalformedCompanyRecord { ordinal: usize, reason: String },

    #[error("line {ordinal}: malformed person record: {reason}")]
    MalformedPersonRecord { ordinal: usize, reason: String },

    #[error(
        "line {ordinal}: person sub-record split into {found} fields, expected {expected}; \
         refusing to zip shifted categories"
    )]
    MalformedPersonSubfields {
        ordinal: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {ordinal}: person record before any company record")]
    OrphanPersonRecord { ordinal: usize },

    #[error("line {ordinal}: person record for company {found} under current company {expected}")]
    CompanyNumberMismatch {
        ordinal: usize,
        expected: String,
        found: String,
    },
}

impl DecodeError {
    /// Classification failures are skip-and-continue; the rest abort the file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DecodeError::UnknownRecordType { .. })
    }
}
