// src/assemble/mod.rs
//
// Streams one file's classified records in order, attaching each person
// record to the most recently seen company record. The "current company"
// slot is explicit fold state scoped to this file, never a cross-file
// global.

use std::fmt;

use chrono::NaiveDate;
use tracing::warn;

use crate::decode::{
    classify, decode_company, decode_header, decode_person, decode_trailer, AppointmentType,
    CompanyRecord, DecodeError, HeaderRecord, PersonDetails, PersonRecord, RecordKind,
    TrailerRecord,
};
use crate::layout::{CompanyStatus, RecordLayout};

/// Non-fatal inconsistencies surfaced alongside a file's rows. These are
/// always reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWarning {
    TrailerCountMismatch { declared: usize, counted: usize },
    UnknownAppointmentCode { ordinal: usize, code: String },
    SkippedLine { ordinal: usize, found: Option<char> },
    MissingTrailer,
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileWarning::TrailerCountMismatch { declared, counted } => write!(
                f,
                "trailer declares {declared} records but {counted} were parsed"
            ),
            FileWarning::UnknownAppointmentCode { ordinal, code } => {
                write!(f, "line {ordinal}: appointment code {code:?} not in the code table")
            }
            FileWarning::SkippedLine { ordinal, found } => {
                write!(f, "line {ordinal}: skipped, discriminator {found:?}")
            }
            FileWarning::MissingTrailer => write!(f, "file ended without a trailer record"),
        }
    }
}

/// One company record's identifying fields joined with one person record:
/// the flat unit every downstream stage consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerAppointmentRow {
    pub company_number: String,
    pub company_name: String,
    pub company_status: CompanyStatus,
    /// Printed full name, the identity-resolution key.
    pub name: String,
    pub appointment: AppointmentType,
    pub person_number: String,
    pub is_corporate: bool,
    pub appointment_date: Option<NaiveDate>,
    pub resignation_date: Option<NaiveDate>,
    pub postcode: Option<String>,
    pub date_of_birth: Option<String>,
    pub details: PersonDetails,
}

impl OfficerAppointmentRow {
    fn join(company: &CompanyRecord, person: PersonRecord) -> Self {
        OfficerAppointmentRow {
            company_number: company.company_number.clone(),
            company_name: company.name.clone(),
            company_status: company.status,
            name: person.details.full_name(),
            appointment: person.appointment,
            person_number: person.person_number,
            is_corporate: person.is_corporate,
            appointment_date: person.appointment_date,
            resignation_date: person.resignation_date,
            postcode: person.postcode,
            date_of_birth: person.date_of_birth,
            details: person.details,
        }
    }
}

/// Everything assembled from one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub header: HeaderRecord,
    pub rows: Vec<OfficerAppointmentRow>,
    pub warnings: Vec<FileWarning>,
    /// Company + person records consumed, the trailer's cross-check target.
    pub records_consumed: usize,
    pub trailer: Option<TrailerRecord>,
}

/// Fold one file's raw lines into a [`FileReport`].
///
/// Classification failures skip the line and continue; decode and structural
/// failures abort the file. Lines after the trailer are ignored by contract.
pub fn assemble_lines<'a, I>(layout: &RecordLayout, lines: I) -> Result<FileReport, DecodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut iter = lines.into_iter().enumerate();

    let header = match iter.next() {
        Some((ordinal, line)) => decode_header(layout, line, ordinal)?,
        None => {
            return Err(DecodeError::MalformedHeader {
                ordinal: 0,
                reason: "empty file".into(),
            })
        }
    };

    let mut current: Option<CompanyRecord> = None;
    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    let mut records_consumed = 0usize;
    let mut trailer = None;

    for (ordinal, line) in iter {
        match classify(layout, line, ordinal) {
            Err(DecodeError::UnknownRecordType { found, .. }) => {
                warn!(ordinal, ?found, "skipping unclassifiable line");
                warnings.push(FileWarning::SkippedLine { ordinal, found });
            }
            Err(other) => return Err(other),
            Ok(RecordKind::Header(_)) => {
                return Err(DecodeError::MalformedHeader {
                    ordinal,
                    reason: "header marker after the first line".into(),
                })
            }
            Ok(RecordKind::Trailer) => {
                let record = decode_trailer(layout, line, ordinal)?;
                if record.record_count != records_consumed {
                    warnings.push(FileWarning::TrailerCountMismatch {
                        declared: record.record_count,
                        counted: records_consumed,
                    });
                }
                trailer = Some(record);
                break;
            }
            Ok(RecordKind::Company) => {
                current = Some(decode_company(layout, line, ordinal)?);
                records_consumed += 1;
            }
            Ok(RecordKind::Person) => {
                let person = decode_person(layout, line, ordinal)?;
                records_consumed += 1;
                let company = current
                    .as_ref()
                    .ok_or(DecodeError::OrphanPersonRecord { ordinal })?;
                // Never silently reattribute: a mismatch means corruption or
                // a classifier bug upstream.
                if person.company_number != company.company_number {
                    return Err(DecodeError::CompanyNumberMismatch {
                        ordinal,
                        expected: company.company_number.clone(),
                        found: person.company_number,
                    });
                }
                if let AppointmentType::Unknown(code) = &person.appointment {
                    warn!(ordinal, code = %code, "appointment code not in the code table");
                    warnings.push(FileWarning::UnknownAppointmentCode {
                        ordinal,
                        code: code.clone(),
                    });
                }
                rows.push(OfficerAppointmentRow::join(company, person));
            }
        }
    }

    if trailer.is_none() {
        warnings.push(FileWarning::MissingTrailer);
    }

    Ok(FileReport {
        header,
        rows,
        warnings,
        records_consumed,
        trailer,
    })
}
