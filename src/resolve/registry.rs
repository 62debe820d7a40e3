// src/resolve/registry.rs

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use tracing::info;

/// Exact-match company-name → canonical-company-number lookup, loaded from a
/// `CompanyName,CompanyNumber` CSV. The only registry operation the
/// disambiguator needs is point lookup.
#[derive(Debug, Default)]
pub struct CompanyRegistry {
    names: HashMap<String, String>,
}

impl CompanyRegistry {
    pub fn empty() -> Self {
        CompanyRegistry::default()
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("opening registry {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("reading registry headers from {}", path.display()))?
            .clone();
        let name_idx = column(&headers, "CompanyName", path)?;
        let number_idx = column(&headers, "CompanyNumber", path)?;

        let mut names = HashMap::new();
        for (i, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("registry {} record {}", path.display(), i))?;
            let name = record.get(name_idx).unwrap_or("").trim();
            let number = record.get(number_idx).unwrap_or("").trim();
            if name.is_empty() || number.is_empty() {
                continue;
            }
            names.insert(name.to_string(), number.to_string());
        }
        info!(entries = names.len(), path = %path.display(), "registry loaded");
        Ok(CompanyRegistry { names })
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, number: impl Into<String>) {
        self.names.insert(name.into(), number.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn column(headers: &csv::StringRecord, wanted: &str, path: &Path) -> Result<usize> {
    match headers.iter().position(|h| h.trim() == wanted) {
        Some(idx) => Ok(idx),
        None => bail!(
            "registry {} has no `{wanted}` column (found: {:?})",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_looks_up() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "CompanyName,CompanyNumber")?;
        writeln!(file, "ACME WIDGETS LIMITED,00345678")?;
        writeln!(file, "OTHER CO LIMITED,SC123456")?;
        writeln!(file, ",00000000")?;

        let registry = CompanyRegistry::from_csv(file.path())?;
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("ACME WIDGETS LIMITED"), Some("00345678"));
        assert_eq!(registry.lookup("ACME WIDGETS"), None);
        Ok(())
    }

    #[test]
    fn missing_column_is_an_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "Name,Number")?;
        writeln!(file, "ACME,00345678")?;
        assert!(CompanyRegistry::from_csv(file.path()).is_err());
        Ok(())
    }
}
