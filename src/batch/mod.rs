// src/batch/mod.rs
//
// Drives classify → decode → assemble over a set of archive files, one
// rayon worker per file. A file's fatal error is recorded and never aborts
// its siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use glob::glob;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::assemble::{assemble_lines, FileWarning, OfficerAppointmentRow};
use crate::decode::{FileKind, TrailerRecord};
use crate::layout::RecordLayout;

/// Per-file accounting kept after the rows are concatenated away.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: PathBuf,
    pub kind: FileKind,
    pub run_number: String,
    pub row_count: usize,
    pub records_consumed: usize,
    pub trailer: Option<TrailerRecord>,
    pub warnings: Vec<FileWarning>,
}

/// A file that could not be processed; the rest of the batch is unaffected.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// The aggregated batch result: every surviving file's rows concatenated in
/// scheduling order (rows of one file stay contiguous and ordered), plus
/// per-file summaries and failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rows: Vec<OfficerAppointmentRow>,
    pub summaries: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
}

/// Expand glob patterns (or literal paths) into a sorted file list.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in
            glob(pattern).with_context(|| format!("invalid input pattern `{pattern}`"))?
        {
            let path = entry.with_context(|| format!("reading glob entry for `{pattern}`"))?;
            if path.is_file() {
                paths.push(path);
                matched = true;
            }
        }
        if !matched {
            warn!(pattern = %pattern, "input pattern matched no files");
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Process every file in parallel and aggregate the results.
#[instrument(level = "info", skip(layout, paths), fields(files = paths.len()))]
pub fn process_files(layout: &RecordLayout, paths: &[PathBuf]) -> BatchReport {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .build_global()
        .ok();

    let start = Instant::now();
    let outcomes: Vec<_> = paths
        .par_iter()
        .map(|path| process_one(layout, path))
        .collect();

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok((rows, summary)) => {
                for warning in &summary.warnings {
                    warn!(path = %summary.path.display(), %warning, "file warning");
                }
                report.rows.extend(rows);
                report.summaries.push(summary);
            }
            Err(failure) => {
                warn!(path = %failure.path.display(), error = %failure.error, "file failed");
                report.failures.push(failure);
            }
        }
    }

    info!(
        rows = report.rows.len(),
        ok = report.summaries.len(),
        failed = report.failures.len(),
        elapsed = ?start.elapsed(),
        "batch complete"
    );
    report
}

fn process_one(
    layout: &RecordLayout,
    path: &Path,
) -> Result<(Vec<OfficerAppointmentRow>, FileSummary), FileFailure> {
    let fail = |error: anyhow::Error| FileFailure {
        path: path.to_path_buf(),
        error,
    };

    let data = fs::read(path)
        .with_context(|| format!("reading {}", path.display()))
        .map_err(fail)?;

    let mut lines: Vec<&[u8]> = data
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect();
    // Artifact of the final newline, not a record.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let report = assemble_lines(layout, lines)
        .with_context(|| format!("decoding {}", path.display()))
        .map_err(fail)?;

    let summary = FileSummary {
        path: path.to_path_buf(),
        kind: report.header.kind,
        run_number: report.header.run_number,
        row_count: report.rows.len(),
        records_consumed: report.records_consumed,
        trailer: report.trailer,
        warnings: report.warnings,
    };
    Ok((report.rows, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlines::{company_line, header_line, person_line, trailer_line, PersonLine};
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, lines: &[Vec<u8>]) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        for line in lines {
            file.write_all(line).unwrap();
            file.write_all(b"\n").unwrap();
        }
        path
    }

    fn person(company_number: &str, surname: &str) -> Vec<u8> {
        person_line(&PersonLine {
            company_number: company_number.into(),
            detail: crate::testlines::detail_from_fields(&[
                "MR", "JOHN", surname, "", "", "", "", "", "", "", "", "", "", "",
            ]),
            ..PersonLine::default()
        })
    }

    #[test]
    fn corrupt_file_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(
            dir.path(),
            "good.dat",
            &[
                header_line("DDDDSNAP", "0055", "20240106"),
                company_line("00345678", 'D', 2, "ACME"),
                person("00345678", "SMITH"),
                person("00345678", "JONES"),
                trailer_line(3),
            ],
        );
        // First line carries no known marker, so the file kind is unknown.
        write_file(
            dir.path(),
            "bad.dat",
            &[company_line("00345678", 'D', 1, "ACME")],
        );

        let paths = expand_patterns(&[format!("{}/*.dat", dir.path().display())]).unwrap();
        assert_eq!(paths.len(), 2);

        let report = process_files(RecordLayout::prod195(), &paths);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].path, good);
        assert_eq!(report.rows.len(), 2);
        // Rows of one file keep their in-file order.
        assert_eq!(report.rows[0].name, "SMITH, JOHN");
        assert_eq!(report.rows[1].name, "JONES, JOHN");
    }

    #[test]
    fn crlf_lines_and_trailing_newline_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.dat");
        let mut file = fs::File::create(&path).unwrap();
        for line in [
            header_line("DDDDSNAP", "0055", "20240106"),
            company_line("00345678", 'D', 1, "ACME"),
            person("00345678", "SMITH"),
            trailer_line(2),
        ] {
            file.write_all(&line).unwrap();
            file.write_all(b"\r\n").unwrap();
        }
        drop(file);

        let report = process_files(RecordLayout::prod195(), &[path]);
        assert!(report.failures.is_empty());
        assert_eq!(report.rows.len(), 1);
        assert!(report.summaries[0].warnings.is_empty());
    }

    #[test]
    fn expand_patterns_accepts_literal_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "one.dat",
            &[header_line("DDDDSNAP", "0055", "20240106")],
        );
        let paths = expand_patterns(&[path.display().to_string()]).unwrap();
        assert_eq!(paths, vec![path]);
    }
}
