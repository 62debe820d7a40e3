// src/resolve/mod.rs
//
// Turns the aggregated appointment rows into identity-resolved rows: a
// de-duplication pre-pass, corporate/individual disambiguation against the
// registry, then per-name-group clustering of the ambiguous remainder.

mod cluster;
mod disambiguate;
mod registry;

pub use cluster::{cluster_group, ClusterLabel, UNRESOLVED_MARKER};
pub use disambiguate::{classify_name, NameClass};
pub use registry::CompanyRegistry;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::assemble::OfficerAppointmentRow;

/// An appointment row after disambiguation. `name` is the printed name, or
/// the canonical company number when the registry linked it. `identity` is
/// set only for rows that went through clustering.
#[derive(Debug, Clone)]
pub struct ResolvedRow {
    pub row: OfficerAppointmentRow,
    pub name: String,
    pub is_company: bool,
    pub identity: Option<ClusterLabel>,
}

/// Drop repeated rows, keeping the last occurrence, over three key sets in
/// turn: (name, company, appointment), (name, company, date of birth),
/// (name, company, postcode). Mirrors the upstream monthly-merge cleanup;
/// absent signals compare equal to each other.
pub fn dedup_rows(rows: Vec<OfficerAppointmentRow>) -> Vec<OfficerAppointmentRow> {
    let before = rows.len();
    let rows = dedup_keep_last(rows, |r| {
        (
            r.name.clone(),
            r.company_number.clone(),
            r.appointment.label().to_string(),
        )
    });
    let rows = dedup_keep_last(rows, |r| {
        (
            r.name.clone(),
            r.company_number.clone(),
            r.date_of_birth.clone(),
        )
    });
    let rows = dedup_keep_last(rows, |r| {
        (r.name.clone(), r.company_number.clone(), r.postcode.clone())
    });
    info!(before, after = rows.len(), "de-duplicated appointment rows");
    rows
}

fn dedup_keep_last<K>(
    rows: Vec<OfficerAppointmentRow>,
    key: impl Fn(&OfficerAppointmentRow) -> K,
) -> Vec<OfficerAppointmentRow>
where
    K: Eq + Hash,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<OfficerAppointmentRow> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert(key(row)))
        .collect();
    kept.reverse();
    kept
}

/// Disambiguate and cluster the whole row set. Input order is preserved;
/// every row comes back classified — nothing is dropped and nothing fails.
#[instrument(level = "info", skip(registry, rows), fields(rows = rows.len()))]
pub fn resolve_rows(registry: &CompanyRegistry, rows: Vec<OfficerAppointmentRow>) -> Vec<ResolvedRow> {
    let mut resolved: Vec<ResolvedRow> = rows
        .into_iter()
        .map(|row| match classify_name(registry, &row.name) {
            NameClass::CorporateLinked(number) => ResolvedRow {
                name: number,
                is_company: true,
                identity: None,
                row,
            },
            NameClass::Corporate => ResolvedRow {
                name: row.name.clone(),
                is_company: true,
                identity: None,
                row,
            },
            NameClass::Individual => ResolvedRow {
                name: row.name.clone(),
                is_company: false,
                identity: None,
                row,
            },
        })
        .collect();

    // Individual names seen 2+ times form the ambiguous groups; unique
    // individual names are implicitly a single identity and pass through.
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in resolved.iter().enumerate() {
        if !row.is_company {
            groups.entry(row.name.clone()).or_default().push(idx);
        }
    }
    groups.retain(|_, indices| indices.len() >= 2);

    let corporate = resolved.iter().filter(|r| r.is_company).count();
    let ambiguous: usize = groups.values().map(Vec::len).sum();
    info!(
        corporate,
        individual = resolved.len() - corporate,
        ambiguous,
        groups = groups.len(),
        "disambiguation split"
    );

    // Each group is independent; label them in parallel against a shared
    // immutable view of the rows.
    let labelled: Vec<(Vec<usize>, Vec<ClusterLabel>)> = {
        let view = &resolved;
        groups
            .into_par_iter()
            .map(|(_, indices)| {
                let labels = cluster_group(indices.iter().map(|&i| {
                    let row = &view[i].row;
                    (row.date_of_birth.as_deref(), row.postcode.as_deref())
                }));
                (indices, labels)
            })
            .collect()
    };

    for (indices, labels) in labelled {
        for (idx, label) in indices.into_iter().zip(labels) {
            resolved[idx].identity = Some(label);
        }
    }
    resolved
}
