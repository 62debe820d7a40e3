// src/testlines.rs
//
// Builders for synthetic Prod195-layout lines, shared by the unit tests.

use crate::layout::RecordLayout;

pub fn header_line(marker: &str, run_number: &str, production_date: &str) -> Vec<u8> {
    format!("{marker}{run_number}{production_date}").into_bytes()
}

pub fn trailer_line(record_count: usize) -> Vec<u8> {
    format!("99999999{record_count:08}").into_bytes()
}

pub fn company_line(company_number: &str, status: char, officers: u32, name: &str) -> Vec<u8> {
    let layout = RecordLayout::prod195();
    let fields = &layout.company;
    let mut line = vec![b' '; fields.name_start];
    put(&mut line, fields.company_number.start, company_number);
    line[layout.discriminator] = layout.company_discriminator as u8;
    line[fields.status.start] = status as u8;
    put(
        &mut line,
        fields.officer_count.start,
        &format!("{officers:04}"),
    );
    // Stored length counts the terminating delimiter.
    put(
        &mut line,
        fields.name_length.start,
        &format!("{:04}", name.len() + 1),
    );
    line.extend_from_slice(name.as_bytes());
    line.push(b'<');
    line
}

#[derive(Debug, Clone)]
pub struct PersonLine {
    pub company_number: String,
    pub appointment_code: String,
    pub person_number: String,
    pub corporate: bool,
    pub appointment_date: String,
    pub resignation_date: String,
    pub postcode: String,
    pub dob_primary: String,
    pub dob_alternate: String,
    pub detail: String,
}

impl Default for PersonLine {
    fn default() -> Self {
        PersonLine {
            company_number: "00345678".into(),
            appointment_code: "01".into(),
            person_number: "123456789012".into(),
            corporate: false,
            appointment_date: String::new(),
            resignation_date: String::new(),
            postcode: String::new(),
            dob_primary: String::new(),
            dob_alternate: String::new(),
            detail: detail_from_fields(&[
                "MR", "JOHN", "SMITH", "", "", "", "", "", "", "", "", "", "", "",
            ]),
        }
    }
}

/// Join named sub-fields with the delimiter, terminating delimiter included.
pub fn detail_from_fields(fields: &[&str]) -> String {
    let mut detail = fields.join("<");
    detail.push('<');
    detail
}

pub fn person_line(template: &PersonLine) -> Vec<u8> {
    let layout = RecordLayout::prod195();
    let fields = &layout.person;
    let mut line = vec![b' '; fields.detail_start];
    put(&mut line, fields.company_number.start, &template.company_number);
    line[layout.discriminator] = layout.person_discriminator as u8;
    put(
        &mut line,
        fields.appointment_type.start,
        &template.appointment_code,
    );
    put(&mut line, fields.person_number.start, &template.person_number);
    if template.corporate {
        line[fields.corporate_indicator] = b'Y';
    }
    put(
        &mut line,
        fields.appointment_date.start,
        &template.appointment_date,
    );
    put(
        &mut line,
        fields.resignation_date.start,
        &template.resignation_date,
    );
    put(&mut line, fields.postcode.start, &template.postcode);
    put(&mut line, fields.dob_primary.start, &template.dob_primary);
    put(&mut line, fields.dob_alternate.start, &template.dob_alternate);
    put(
        &mut line,
        fields.detail_length.start,
        &format!("{:04}", template.detail.len()),
    );
    line.extend_from_slice(template.detail.as_bytes());
    line
}

fn put(line: &mut [u8], start: usize, text: &str) {
    for (i, b) in text.bytes().enumerate() {
        line[start + i] = b;
    }
}
