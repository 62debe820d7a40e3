// src/layout/codes.rs

use serde::{Deserialize, Serialize};

/// Company status as flagged in the status byte of a company record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyStatus {
    Converted,
    Dissolved,
    InLiquidation,
    InReceivership,
    Other,
}

impl CompanyStatus {
    /// Human-readable form, as printed in the output table.
    pub fn describe(&self) -> &'static str {
        match self {
            CompanyStatus::Converted => "Converted/closed company",
            CompanyStatus::Dissolved => "Dissolved company",
            CompanyStatus::InLiquidation => "Company in liquidation",
            CompanyStatus::InReceivership => "Company in receivership",
            CompanyStatus::Other => "Else",
        }
    }
}

/// The appointment roles named by the published two-character code table.
///
/// The provider introduces new codes over time, so an unmapped code is not
/// represented here; the decoder carries it through as a raw-code variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentKind {
    CurrentSecretary,
    CurrentDirector,
    NonDesignatedLlpMember,
    DesignatedLlpMember,
    JudicialFactor,
    CharitiesActReceiver,
    CaiceActManager,
    SeAdministrativeOrgan,
    SeSupervisoryOrgan,
    SeManagementOrgan,
}

impl AppointmentKind {
    pub fn describe(&self) -> &'static str {
        match self {
            AppointmentKind::CurrentSecretary => "Current Secretary",
            AppointmentKind::CurrentDirector => "Current Director",
            AppointmentKind::NonDesignatedLlpMember => "Current non-designated LLP Member",
            AppointmentKind::DesignatedLlpMember => "Current designated LLP Member",
            AppointmentKind::JudicialFactor => "Current Judicial Factor",
            AppointmentKind::CharitiesActReceiver => {
                "Current Receiver or Manager appointed under the Charities Act"
            }
            AppointmentKind::CaiceActManager => {
                "Current Manager appointed under the CAICE Act"
            }
            AppointmentKind::SeAdministrativeOrgan => {
                "Current SE Member of Administrative Organ"
            }
            AppointmentKind::SeSupervisoryOrgan => "Current SE Member of Supervisory Organ",
            AppointmentKind::SeManagementOrgan => "Current SE Member of Management Organ",
        }
    }
}
