// src/decode/mod.rs
//
// Fixed-width record decoding: classification by marker/discriminator byte,
// then byte-range field extraction under a swappable RecordLayout.

mod classify;
mod error;
mod fixed;
mod records;

pub use classify::{classify, RecordKind};
pub use error::DecodeError;
pub use fixed::{decode_company, decode_header, decode_person, decode_trailer, latin1};
pub use records::{
    AppointmentType, CompanyRecord, FileKind, HeaderRecord, PersonDetails, PersonRecord,
    TrailerRecord,
};
