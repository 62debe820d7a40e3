// src/output/mod.rs
//
// CSV emission of the appointment table (pre-resolution) and the final
// resolved table. Column order is the published interface; the resolved
// table appends the identity label and corporate-link flag.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use tracing::info;

use crate::assemble::OfficerAppointmentRow;
use crate::resolve::ResolvedRow;

const BASE_COLUMNS: &[&str] = &[
    "company_number",
    "company_name",
    "company_status",
    "name",
    "appointment_type",
    "person_number",
    "is_corporate_appointee",
    "appointment_date",
    "resignation_date",
    "postal_code",
    "date_of_birth",
    "title",
    "forenames",
    "surname",
    "honours",
    "care_of",
    "po_box",
    "address_line_1",
    "address_line_2",
    "post_town",
    "county",
    "country",
    "occupation",
    "nationality",
    "usual_residential_country",
];

pub fn write_appointments(path: impl AsRef<Path>, rows: &[OfficerAppointmentRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(BASE_COLUMNS)?;
    for row in rows {
        writer.write_record(base_fields(row, &row.name))?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "appointment table written");
    Ok(())
}

pub fn write_resolved(path: impl AsRef<Path>, rows: &[ResolvedRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut columns: Vec<&str> = BASE_COLUMNS.to_vec();
    columns.push("identity");
    columns.push("is_company");
    writer.write_record(&columns)?;

    for row in rows {
        let mut fields = base_fields(&row.row, &row.name);
        fields.push(row.identity.map(|label| label.render()).unwrap_or_default());
        fields.push(row.is_company.to_string());
        writer.write_record(&fields)?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "resolved table written");
    Ok(())
}

fn base_fields(row: &OfficerAppointmentRow, name: &str) -> Vec<String> {
    let date = |d: &Option<NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    };
    let opt = |s: &Option<String>| s.clone().unwrap_or_default();
    let details = &row.details;
    vec![
        row.company_number.clone(),
        row.company_name.clone(),
        row.company_status.describe().to_string(),
        name.to_string(),
        row.appointment.label().to_string(),
        row.person_number.clone(),
        row.is_corporate.to_string(),
        date(&row.appointment_date),
        date(&row.resignation_date),
        opt(&row.postcode),
        opt(&row.date_of_birth),
        opt(&details.title),
        opt(&details.forenames),
        opt(&details.surname),
        opt(&details.honours),
        opt(&details.care_of),
        opt(&details.po_box),
        opt(&details.address_line_1),
        opt(&details.address_line_2),
        opt(&details.post_town),
        opt(&details.county),
        opt(&details.country),
        opt(&details.occupation),
        opt(&details.nationality),
        opt(&details.usual_residential_country),
    ]
}
