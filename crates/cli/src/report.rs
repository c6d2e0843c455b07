//! Report output: one log line and one CSV row per bypassed pull request.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use audit::{AuditError, BypassedPullRequest};

/// CSV report, relative to the working directory. Overwritten every run.
pub const REPORT_FILE: &str = "bypassed_prs.csv";

/// Column names of the CSV header row.
pub const HEADER: [&str; 4] = ["Id", "Reason", "Closed Date", "Reviewers"];

/// Log the summary and each record, and write the CSV report to `path`.
pub fn emit(path: &Path, records: &[BypassedPullRequest]) -> Result<(), AuditError> {
    info!("Found {} PRs.", records.len());

    let file = File::create(path)
        .map_err(|e| AuditError::report(format!("Cannot create {}: {e}", path.display())))?;
    write_report(file, records)?;

    info!(path = %path.display(), "Report written");
    Ok(())
}

/// Write the header and one row per record to `writer`, logging each record.
///
/// Returns the writer once everything has been flushed into it.
pub fn write_report<W: Write>(writer: W, records: &[BypassedPullRequest]) -> Result<W, AuditError> {
    let mut csv = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(HEADER).map_err(csv_error)?;
    for record in records {
        let row = Row::from(record);
        info!(
            "{} - {} - {} - {}",
            row.id, row.reason, row.closed_date, row.reviewers
        );
        csv.write_record([&row.id, &row.reason, &row.closed_date, &row.reviewers])
            .map_err(csv_error)?;
    }

    csv.into_inner()
        .map_err(|e| AuditError::report(format!("Cannot flush report: {}", e.error())))
}

fn csv_error(e: csv::Error) -> AuditError {
    AuditError::report(format!("Cannot write report row: {e}"))
}

/// A record rendered as report text.
struct Row {
    id: String,
    reason: String,
    closed_date: String,
    reviewers: String,
}

impl From<&BypassedPullRequest> for Row {
    fn from(record: &BypassedPullRequest) -> Self {
        Self {
            id: record.id.to_string(),
            reason: record.reason.clone(),
            closed_date: record
                .closed_date
                .map(|ts| ts.date_string())
                .unwrap_or_default(),
            reviewers: format_name_list(&record.approvers),
        }
    }
}

/// Render names as `['Alice', 'Bob']`.
///
/// A name containing `'` but no `"` is wrapped in double quotes instead;
/// otherwise backslashes and single quotes are escaped.
pub fn format_name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| quote_name(name)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote_name(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\");
    if name.contains('\'') && !name.contains('"') {
        format!("\"{escaped}\"")
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}
