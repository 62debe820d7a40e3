// src/layout/mod.rs

mod codes;

pub use codes::{AppointmentKind, CompanyStatus};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Half-open byte window `[start, end)` within a record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        ByteRange { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Slice `line`, or `None` when the line ends before `end`.
    pub fn slice<'a>(&self, line: &'a [u8]) -> Option<&'a [u8]> {
        line.get(self.start..self.end)
    }

    /// Slice `line`, clamping `end` to the line length. `None` only when the
    /// line ends at or before `start`. Trailer and header lines are often
    /// written without right padding, so their last field needs this.
    pub fn slice_clamped<'a>(&self, line: &'a [u8]) -> Option<&'a [u8]> {
        if line.len() <= self.start {
            return None;
        }
        Some(&line[self.start..self.end.min(line.len())])
    }
}

/// Field windows of the header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLayout {
    pub run_number: ByteRange,
    pub production_date: ByteRange,
}

/// Field windows of the trailer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerLayout {
    pub record_count: ByteRange,
}

/// Field windows of a company record. The company name is length-prefixed:
/// `name_length` holds its byte count (terminating delimiter included) and the
/// name bytes start at `name_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLayout {
    pub company_number: ByteRange,
    pub status: ByteRange,
    pub officer_count: ByteRange,
    pub name_length: ByteRange,
    pub name_start: usize,
}

/// Field windows of a person record.
///
/// Two date-of-birth windows exist across format revisions; when both carry
/// data the alternate (later) window wins. The variable-length detail
/// sub-record starts at `detail_start`, its byte count held by
/// `detail_length`, and splits on `detail_delimiter` into `detail_categories`
/// plus one trailing empty token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonLayout {
    pub company_number: ByteRange,
    pub appointment_type: ByteRange,
    pub person_number: ByteRange,
    pub corporate_indicator: usize,
    pub appointment_date: ByteRange,
    pub resignation_date: ByteRange,
    pub postcode: ByteRange,
    pub dob_primary: ByteRange,
    pub dob_alternate: ByteRange,
    pub detail_length: ByteRange,
    pub detail_start: usize,
    pub detail_delimiter: char,
    pub detail_categories: Vec<String>,
}

/// The versioned positional contract for one bulk-product format revision:
/// record markers, the discriminator byte, every field window, and the two
/// published code tables. Swappable from a YAML/JSON file so a provider
/// format change never requires touching the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub snapshot_marker: String,
    pub update_marker: String,
    pub trailer_marker: String,
    /// Offset of the record-kind discriminator byte.
    pub discriminator: usize,
    pub company_discriminator: char,
    pub person_discriminator: char,
    pub header: HeaderLayout,
    pub trailer: TrailerLayout,
    pub company: CompanyLayout,
    pub person: PersonLayout,
    pub status_codes: BTreeMap<String, CompanyStatus>,
    pub appointment_codes: BTreeMap<String, AppointmentKind>,
}

impl RecordLayout {
    /// Load a layout from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading layout file {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let layout: RecordLayout = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML layout {}", path.display()))?,
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON layout {}", path.display()))?,
            other => bail!("unsupported layout extension `{other}` for {}", path.display()),
        };
        Ok(layout)
    }

    /// The compiled-in Prod195 snapshot/update layout.
    pub fn prod195() -> &'static RecordLayout {
        &PROD195
    }

    pub fn status_for(&self, code: &str) -> Option<CompanyStatus> {
        self.status_codes.get(code).copied()
    }

    pub fn appointment_for(&self, code: &str) -> Option<AppointmentKind> {
        self.appointment_codes.get(code).copied()
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        PROD195.clone()
    }
}

static PROD195: Lazy<RecordLayout> = Lazy::new(|| RecordLayout {
    snapshot_marker: "DDDDSNAP".into(),
    update_marker: "DDDDUPDT".into(),
    trailer_marker: "99999999".into(),
    discriminator: 8,
    company_discriminator: '1',
    person_discriminator: '2',
    header: HeaderLayout {
        run_number: ByteRange::new(8, 12),
        production_date: ByteRange::new(12, 20),
    },
    trailer: TrailerLayout {
        record_count: ByteRange::new(8, 16),
    },
    company: CompanyLayout {
        company_number: ByteRange::new(0, 8),
        status: ByteRange::new(9, 10),
        officer_count: ByteRange::new(32, 36),
        name_length: ByteRange::new(36, 40),
        name_start: 40,
    },
    person: PersonLayout {
        company_number: ByteRange::new(0, 8),
        appointment_type: ByteRange::new(10, 12),
        person_number: ByteRange::new(12, 24),
        corporate_indicator: 24,
        appointment_date: ByteRange::new(32, 40),
        resignation_date: ByteRange::new(40, 48),
        postcode: ByteRange::new(48, 56),
        dob_primary: ByteRange::new(56, 64),
        dob_alternate: ByteRange::new(64, 72),
        detail_length: ByteRange::new(72, 76),
        detail_start: 76,
        detail_delimiter: '<',
        detail_categories: vec![
            "title".into(),
            "forenames".into(),
            "surname".into(),
            "honours".into(),
            "care_of".into(),
            "po_box".into(),
            "address_line_1".into(),
            "address_line_2".into(),
            "post_town".into(),
            "county".into(),
            "country".into(),
            "occupation".into(),
            "nationality".into(),
            "usual_residential_country".into(),
        ],
    },
    status_codes: BTreeMap::from([
        ("C".into(), CompanyStatus::Converted),
        ("D".into(), CompanyStatus::Dissolved),
        ("L".into(), CompanyStatus::InLiquidation),
        ("R".into(), CompanyStatus::InReceivership),
        (" ".into(), CompanyStatus::Other),
    ]),
    appointment_codes: BTreeMap::from([
        ("00".into(), AppointmentKind::CurrentSecretary),
        ("01".into(), AppointmentKind::CurrentDirector),
        ("04".into(), AppointmentKind::NonDesignatedLlpMember),
        ("05".into(), AppointmentKind::DesignatedLlpMember),
        ("11".into(), AppointmentKind::JudicialFactor),
        ("12".into(), AppointmentKind::CharitiesActReceiver),
        ("13".into(), AppointmentKind::CaiceActManager),
        ("17".into(), AppointmentKind::SeAdministrativeOrgan),
        ("18".into(), AppointmentKind::SeSupervisoryOrgan),
        ("19".into(), AppointmentKind::SeManagementOrgan),
    ]),
});
