// src/decode/records.rs

use chrono::NaiveDate;

use crate::layout::{AppointmentKind, CompanyStatus};

/// Whether a file is a full dump or an incremental update, per its header
/// marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Snapshot,
    Update,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Snapshot => "snapshot_file",
            FileKind::Update => "update_file",
        }
    }
}

/// First record of every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub kind: FileKind,
    pub run_number: String,
    pub production_date: NaiveDate,
}

/// Last data record of every file; `record_count` cross-checks the number of
/// company + person records the file actually carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerRecord {
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub company_number: String,
    pub status: CompanyStatus,
    pub declared_officer_count: u32,
    pub name: String,
}

/// An appointment-type code after the table lookup. New codes appear in the
/// upstream product over time, so an unmapped code is preserved verbatim
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentType {
    Known(AppointmentKind),
    Unknown(String),
}

impl AppointmentType {
    pub fn label(&self) -> &str {
        match self {
            AppointmentType::Known(kind) => kind.describe(),
            AppointmentType::Unknown(code) => code,
        }
    }
}

/// The variable-length delimited sub-record tail of a person record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDetails {
    pub title: Option<String>,
    pub forenames: Option<String>,
    pub surname: Option<String>,
    pub honours: Option<String>,
    pub care_of: Option<String>,
    pub po_box: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub post_town: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub occupation: Option<String>,
    pub nationality: Option<String>,
    pub usual_residential_country: Option<String>,
}

impl PersonDetails {
    /// Zip decoded tokens against the layout's category list. Category names
    /// the struct does not know are ignored, which lets a layout revision add
    /// columns without breaking older builds.
    pub fn from_tokens(categories: &[String], tokens: &[Option<String>]) -> Self {
        let mut details = PersonDetails::default();
        for (category, token) in categories.iter().zip(tokens.iter()) {
            let slot = match category.as_str() {
                "title" => &mut details.title,
                "forenames" => &mut details.forenames,
                "surname" => &mut details.surname,
                "honours" => &mut details.honours,
                "care_of" => &mut details.care_of,
                "po_box" => &mut details.po_box,
                "address_line_1" => &mut details.address_line_1,
                "address_line_2" => &mut details.address_line_2,
                "post_town" => &mut details.post_town,
                "county" => &mut details.county,
                "country" => &mut details.country,
                "occupation" => &mut details.occupation,
                "nationality" => &mut details.nationality,
                "usual_residential_country" => &mut details.usual_residential_country,
                _ => continue,
            };
            *slot = token.clone();
        }
        details
    }

    /// The printed full name downstream identity resolution keys on:
    /// `SURNAME, FORENAMES` when both are present. Corporate appointees carry
    /// their whole name in the surname field.
    pub fn full_name(&self) -> String {
        match (self.surname.as_deref(), self.forenames.as_deref()) {
            (Some(surname), Some(forenames)) => format!("{surname}, {forenames}"),
            (Some(surname), None) => surname.to_string(),
            (None, Some(forenames)) => forenames.to_string(),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub company_number: String,
    pub appointment: AppointmentType,
    pub person_number: String,
    pub is_corporate: bool,
    pub appointment_date: Option<NaiveDate>,
    pub resignation_date: Option<NaiveDate>,
    pub postcode: Option<String>,
    /// Year-month granularity upstream; kept as the raw trimmed string.
    pub date_of_birth: Option<String>,
    pub details: PersonDetails,
}
