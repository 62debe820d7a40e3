// src/decode/fixed.rs
//
// Field extraction by byte-range slicing against a RecordLayout. The archives
// are ASCII/Latin-1, so bytes map to chars by the Latin-1 identity mapping
// and never through UTF-8.

use chrono::NaiveDate;

use crate::decode::error::DecodeError;
use crate::decode::records::{
    AppointmentType, CompanyRecord, FileKind, HeaderRecord, PersonDetails, PersonRecord,
    TrailerRecord,
};
use crate::layout::{ByteRange, RecordLayout};

const DATE_FORMAT: &str = "%Y%m%d";
const CORPORATE_FLAG: u8 = b'Y';

/// Latin-1 bytes to an owned string (identity mapping per byte).
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// A trimmed field, `None` when all blank.
fn optional(bytes: &[u8]) -> Option<String> {
    let text = latin1(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strict<'a>(
    range: ByteRange,
    line: &'a [u8],
    err: impl Fn(String) -> DecodeError,
) -> Result<&'a [u8], DecodeError> {
    range.slice(line).ok_or_else(|| {
        err(format!(
            "line length {} ends before byte {}",
            line.len(),
            range.end
        ))
    })
}

pub fn decode_header(
    layout: &RecordLayout,
    line: &[u8],
    ordinal: usize,
) -> Result<HeaderRecord, DecodeError> {
    let kind = if line.starts_with(layout.snapshot_marker.as_bytes()) {
        FileKind::Snapshot
    } else if line.starts_with(layout.update_marker.as_bytes()) {
        FileKind::Update
    } else {
        let prefix = &line[..line.len().min(layout.snapshot_marker.len())];
        return Err(DecodeError::UnknownFileKind {
            ordinal,
            marker: latin1(prefix),
        });
    };

    let malformed = |reason: String| DecodeError::MalformedHeader { ordinal, reason };
    let run_number = layout
        .header
        .run_number
        .slice_clamped(line)
        .ok_or_else(|| malformed("run number field missing".into()))?;
    let date_bytes = layout
        .header
        .production_date
        .slice_clamped(line)
        .ok_or_else(|| malformed("production date field missing".into()))?;
    let date_text = latin1(date_bytes);
    let production_date = NaiveDate::parse_from_str(date_text.trim(), DATE_FORMAT)
        .map_err(|_| malformed(format!("unparseable production date {date_text:?}")))?;

    Ok(HeaderRecord {
        kind,
        run_number: latin1(run_number).trim().to_string(),
        production_date,
    })
}

pub fn decode_trailer(
    layout: &RecordLayout,
    line: &[u8],
    ordinal: usize,
) -> Result<TrailerRecord, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedTrailer { ordinal, reason };
    let count_bytes = layout
        .trailer
        .record_count
        .slice_clamped(line)
        .ok_or_else(|| malformed("record count field missing".into()))?;
    let count_text = latin1(count_bytes);
    let record_count = count_text
        .trim()
        .parse::<usize>()
        .map_err(|_| malformed(format!("non-numeric record count {count_text:?}")))?;
    Ok(TrailerRecord { record_count })
}

pub fn decode_company(
    layout: &RecordLayout,
    line: &[u8],
    ordinal: usize,
) -> Result<CompanyRecord, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedCompanyRecord { ordinal, reason };

    // Defensive: the classifier already dispatched on this byte.
    match line.get(layout.discriminator).map(|&b| b as char) {
        Some(c) if c == layout.company_discriminator => {}
        other => {
            return Err(malformed(format!(
                "discriminator {other:?} picked up as a company line"
            )))
        }
    }

    let fields = &layout.company;
    let company_number = latin1(strict(fields.company_number, line, malformed)?);

    let status_code = latin1(strict(fields.status, line, malformed)?);
    let status = layout
        .status_for(&status_code)
        .ok_or_else(|| malformed(format!("unmapped status code {status_code:?}")))?;

    let count_text = latin1(strict(fields.officer_count, line, malformed)?);
    let declared_officer_count = count_text
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed(format!("non-numeric officer count {count_text:?}")))?;

    let len_text = latin1(strict(fields.name_length, line, malformed)?);
    let name_length = len_text
        .trim()
        .parse::<usize>()
        .map_err(|_| malformed(format!("non-numeric name length {len_text:?}")))?;

    let name_end = fields.name_start + name_length;
    if name_end > line.len() {
        return Err(malformed(format!(
            "name length {} overruns line of {} bytes",
            name_length,
            line.len()
        )));
    }
    // The stored length counts the terminating delimiter, which is dropped.
    let name = if name_length == 0 {
        String::new()
    } else {
        latin1(&line[fields.name_start..name_end - 1])
    };

    Ok(CompanyRecord {
        company_number,
        status,
        declared_officer_count,
        name,
    })
}

pub fn decode_person(
    layout: &RecordLayout,
    line: &[u8],
    ordinal: usize,
) -> Result<PersonRecord, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedPersonRecord { ordinal, reason };

    match line.get(layout.discriminator).map(|&b| b as char) {
        Some(c) if c == layout.person_discriminator => {}
        other => {
            return Err(malformed(format!(
                "discriminator {other:?} picked up as a person line"
            )))
        }
    }

    let fields = &layout.person;
    let company_number = latin1(strict(fields.company_number, line, malformed)?);

    let code = latin1(strict(fields.appointment_type, line, malformed)?);
    let appointment = match layout.appointment_for(&code) {
        Some(kind) => AppointmentType::Known(kind),
        None => AppointmentType::Unknown(code),
    };

    let person_number = latin1(strict(fields.person_number, line, malformed)?);
    let is_corporate = line.get(fields.corporate_indicator) == Some(&CORPORATE_FLAG);

    let appointment_date = decode_date(fields.appointment_date, line, "appointment", malformed)?;
    let resignation_date = decode_date(fields.resignation_date, line, "resignation", malformed)?;
    let postcode = optional(strict(fields.postcode, line, malformed)?);

    // Two DOB windows exist across format revisions; the later one wins when
    // both are populated.
    let date_of_birth = optional(strict(fields.dob_alternate, line, malformed)?)
        .or(optional(strict(fields.dob_primary, line, malformed)?));

    let len_text = latin1(strict(fields.detail_length, line, malformed)?);
    let detail_length = len_text
        .trim()
        .parse::<usize>()
        .map_err(|_| malformed(format!("non-numeric detail length {len_text:?}")))?;
    let detail_end = fields.detail_start + detail_length;
    if detail_end > line.len() {
        return Err(malformed(format!(
            "detail length {} overruns line of {} bytes",
            detail_length,
            line.len()
        )));
    }
    let detail = latin1(&line[fields.detail_start..detail_end]);

    let mut tokens: Vec<&str> = detail.split(fields.detail_delimiter).collect();
    // The terminating delimiter yields one empty trailing token.
    let expected = fields.detail_categories.len() + 1;
    if tokens.len() == expected + 1 {
        // Known upstream variant with a spurious leading empty token.
        tokens.remove(0);
    }
    if tokens.len() != expected {
        // Letting this through would shift every later category, silently
        // corrupting all subsequent fields.
        return Err(DecodeError::MalformedPersonSubfields {
            ordinal,
            expected,
            found: tokens.len(),
        });
    }
    let values: Vec<Option<String>> = tokens
        .iter()
        .take(fields.detail_categories.len())
        .map(|t| {
            if t.is_empty() {
                None
            } else {
                Some((*t).to_string())
            }
        })
        .collect();
    let details = PersonDetails::from_tokens(&fields.detail_categories, &values);

    Ok(PersonRecord {
        company_number,
        appointment,
        person_number,
        is_corporate,
        appointment_date,
        resignation_date,
        postcode,
        date_of_birth,
        details,
    })
}

fn decode_date(
    range: ByteRange,
    line: &[u8],
    what: &str,
    malformed: impl Fn(String) -> DecodeError + Copy,
) -> Result<Option<NaiveDate>, DecodeError> {
    match optional(strict(range, line, malformed)?) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| malformed(format!("unparseable {what} date {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::AppointmentKind;
    use crate::testlines::{company_line, detail_from_fields, header_line, person_line, trailer_line, PersonLine};

    fn layout() -> &'static RecordLayout {
        RecordLayout::prod195()
    }

    #[test]
    fn decodes_snapshot_and_update_headers() {
        let rec = decode_header(layout(), &header_line("DDDDSNAP", "0055", "20240106"), 0).unwrap();
        assert_eq!(rec.kind, FileKind::Snapshot);
        assert_eq!(rec.run_number, "0055");
        assert_eq!(
            rec.production_date,
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );

        let rec = decode_header(layout(), &header_line("DDDDUPDT", "0056", "20240203"), 0).unwrap();
        assert_eq!(rec.kind, FileKind::Update);
    }

    #[test]
    fn unknown_marker_is_unknown_file_kind() {
        let err = decode_header(layout(), &header_line("XXXXXXXX", "0055", "20240106"), 0).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownFileKind {
                ordinal: 0,
                marker: "XXXXXXXX".into(),
            }
        );
    }

    #[test]
    fn bad_production_date_is_malformed_header() {
        let err = decode_header(layout(), &header_line("DDDDSNAP", "0055", "2024ABCD"), 0).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader { ordinal: 0, .. }));
    }

    #[test]
    fn decodes_trailer_count() {
        let rec = decode_trailer(layout(), &trailer_line(1234), 9).unwrap();
        assert_eq!(rec.record_count, 1234);

        let err = decode_trailer(layout(), b"99999999ABCDEFGH", 9).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedTrailer { .. }));
    }

    #[test]
    fn decodes_company_record() {
        let line = company_line("00345678", 'D', 2, "ACME WIDGETS LIMITED");
        let rec = decode_company(layout(), &line, 1).unwrap();
        assert_eq!(rec.company_number, "00345678");
        assert_eq!(rec.status, crate::layout::CompanyStatus::Dissolved);
        assert_eq!(rec.declared_officer_count, 2);
        assert_eq!(rec.name, "ACME WIDGETS LIMITED");
    }

    #[test]
    fn blank_status_maps_to_else() {
        let line = company_line("00345678", ' ', 1, "ACME");
        let rec = decode_company(layout(), &line, 1).unwrap();
        assert_eq!(rec.status, crate::layout::CompanyStatus::Other);
    }

    #[test]
    fn unmapped_status_code_is_an_error() {
        let line = company_line("00345678", 'Q', 1, "ACME");
        let err = decode_company(layout(), &line, 4).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedCompanyRecord { ordinal: 4, .. }
        ));
    }

    #[test]
    fn company_name_overrun_is_an_error() {
        let mut line = company_line("00345678", 'D', 1, "ACME");
        // Inflate the stored name length beyond the line end.
        line[36..40].copy_from_slice(b"9000");
        let err = decode_company(layout(), &line, 2).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedCompanyRecord { .. }));
    }

    fn sample_person() -> PersonLine {
        PersonLine {
            company_number: "00345678".into(),
            appointment_code: "01".into(),
            person_number: "123456789012".into(),
            corporate: false,
            appointment_date: "20230415".into(),
            resignation_date: "".into(),
            postcode: "AB1 2CD".into(),
            dob_primary: "".into(),
            dob_alternate: "196305".into(),
            detail: detail_from_fields(&[
                "MR", "JOHN", "SMITH", "", "", "", "1 HIGH ST", "", "LONDON", "", "ENGLAND",
                "ENGINEER", "BRITISH", "ENGLAND",
            ]),
        }
    }

    #[test]
    fn decodes_person_record() {
        let line = person_line(&sample_person());
        let rec = decode_person(layout(), &line, 2).unwrap();
        assert_eq!(rec.company_number, "00345678");
        assert_eq!(
            rec.appointment,
            AppointmentType::Known(AppointmentKind::CurrentDirector)
        );
        assert_eq!(rec.person_number, "123456789012");
        assert!(!rec.is_corporate);
        assert_eq!(
            rec.appointment_date,
            Some(NaiveDate::from_ymd_opt(2023, 4, 15).unwrap())
        );
        assert_eq!(rec.resignation_date, None);
        assert_eq!(rec.postcode.as_deref(), Some("AB1 2CD"));
        assert_eq!(rec.date_of_birth.as_deref(), Some("196305"));
        assert_eq!(rec.details.title.as_deref(), Some("MR"));
        assert_eq!(rec.details.forenames.as_deref(), Some("JOHN"));
        assert_eq!(rec.details.surname.as_deref(), Some("SMITH"));
        assert_eq!(rec.details.honours, None);
        assert_eq!(rec.details.address_line_1.as_deref(), Some("1 HIGH ST"));
        assert_eq!(rec.details.occupation.as_deref(), Some("ENGINEER"));
        assert_eq!(rec.details.full_name(), "SMITH, JOHN");
    }

    #[test]
    fn later_dob_window_wins_over_primary() {
        let mut template = sample_person();
        template.dob_primary = "195001".into();
        template.dob_alternate = "196305".into();
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.date_of_birth.as_deref(), Some("196305"));

        template.dob_alternate = "".into();
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.date_of_birth.as_deref(), Some("195001"));

        template.dob_primary = "".into();
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.date_of_birth, None);
    }

    #[test]
    fn corporate_indicator_flag() {
        let mut template = sample_person();
        template.corporate = true;
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert!(rec.is_corporate);
    }

    #[test]
    fn unknown_appointment_code_is_preserved() {
        let mut template = sample_person();
        template.appointment_code = "42".into();
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.appointment, AppointmentType::Unknown("42".into()));
        assert_eq!(rec.appointment.label(), "42");
    }

    #[test]
    fn leading_empty_subfield_token_is_dropped() {
        let mut template = sample_person();
        template.detail = format!("<{}", template.detail);
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.details.title.as_deref(), Some("MR"));
        assert_eq!(rec.details.surname.as_deref(), Some("SMITH"));
    }

    #[test]
    fn wrong_subfield_count_is_fatal_with_counts() {
        let mut template = sample_person();
        template.detail = detail_from_fields(&["MR", "JOHN", "SMITH"]);
        let err = decode_person(layout(), &person_line(&template), 17).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedPersonSubfields {
                ordinal: 17,
                expected: 15,
                found: 4,
            }
        );
    }

    #[test]
    fn blank_date_fields_decode_to_none() {
        let mut template = sample_person();
        template.appointment_date = "".into();
        template.postcode = "".into();
        let rec = decode_person(layout(), &person_line(&template), 2).unwrap();
        assert_eq!(rec.appointment_date, None);
        assert_eq!(rec.postcode, None);
    }

    #[test]
    fn garbage_date_is_malformed_person() {
        let mut template = sample_person();
        template.appointment_date = "2023XX15".into();
        let err = decode_person(layout(), &person_line(&template), 3).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPersonRecord { .. }));
    }

    // Re-encode a decoded person back into the fixed layout and compare with
    // the source line; the fixed windows are lossless so the bytes must match.
    #[test]
    fn person_fixed_fields_round_trip() {
        let layout = layout();
        let fields = &layout.person;
        let template = sample_person();
        let line = person_line(&template);
        let rec = decode_person(layout, &line, 2).unwrap();

        let mut encoded = vec![b' '; fields.detail_start];
        let put = |buf: &mut [u8], range: crate::layout::ByteRange, text: &str| {
            for (i, b) in text.bytes().take(range.len()).enumerate() {
                buf[range.start + i] = b;
            }
        };
        put(&mut encoded, fields.company_number, &rec.company_number);
        encoded[layout.discriminator] = layout.person_discriminator as u8;
        let code = match &rec.appointment {
            AppointmentType::Known(kind) => layout
                .appointment_codes
                .iter()
                .find(|(_, k)| *k == kind)
                .map(|(c, _)| c.clone())
                .unwrap(),
            AppointmentType::Unknown(code) => code.clone(),
        };
        put(&mut encoded, fields.appointment_type, &code);
        put(&mut encoded, fields.person_number, &rec.person_number);
        if rec.is_corporate {
            encoded[fields.corporate_indicator] = b'Y';
        }
        if let Some(date) = rec.appointment_date {
            put(
                &mut encoded,
                fields.appointment_date,
                &date.format("%Y%m%d").to_string(),
            );
        }
        if let Some(date) = rec.resignation_date {
            put(
                &mut encoded,
                fields.resignation_date,
                &date.format("%Y%m%d").to_string(),
            );
        }
        if let Some(postcode) = &rec.postcode {
            put(&mut encoded, fields.postcode, postcode);
        }
        if let Some(dob) = &rec.date_of_birth {
            put(&mut encoded, fields.dob_alternate, dob);
        }

        assert_eq!(&encoded[..fields.detail_length.start], &line[..fields.detail_length.start]);
    }
}
