// src/decode/classify.rs

use crate::decode::error::DecodeError;
use crate::decode::records::FileKind;
use crate::layout::RecordLayout;

/// What a raw line claims to be, judged purely from fixed byte positions.
/// No field is interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Header(FileKind),
    Trailer,
    Company,
    Person,
}

/// Classify one raw line by its marker prefix, falling back to the
/// discriminator byte. An unrecognised discriminator rejects only this line.
pub fn classify(
    layout: &RecordLayout,
    line: &[u8],
    ordinal: usize,
) -> Result<RecordKind, DecodeError> {
    if line.starts_with(layout.snapshot_marker.as_bytes()) {
        return Ok(RecordKind::Header(FileKind::Snapshot));
    }
    if line.starts_with(layout.update_marker.as_bytes()) {
        return Ok(RecordKind::Header(FileKind::Update));
    }
    if line.starts_with(layout.trailer_marker.as_bytes()) {
        return Ok(RecordKind::Trailer);
    }

    let found = line.get(layout.discriminator).map(|&b| b as char);
    match found {
        Some(c) if c == layout.company_discriminator => Ok(RecordKind::Company),
        Some(c) if c == layout.person_discriminator => Ok(RecordKind::Person),
        _ => Err(DecodeError::UnknownRecordType { ordinal, found }),
    }
}
