//! CSV rendering of student reports.
//!
//! # Invariants
//! - Column order is fixed by `CSV_HEADERS`.
//! - Rows are joined with `\n` and the output has no trailing newline.
//! - Fields containing a comma, quote or line break are quoted (RFC 4180).

use crate::service::report_service::StudentReport;
use chrono::NaiveDate;
use std::borrow::Cow;

pub const CSV_HEADERS: [&str; 8] = [
    "Name",
    "Center",
    "Present",
    "Absent",
    "Late",
    "Excused",
    "Total Sessions",
    "Attendance Rate",
];

/// Renders one header row plus one row per report.
pub fn export_csv(reports: &[StudentReport]) -> String {
    let mut lines = Vec::with_capacity(reports.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for report in reports {
        let stats = &report.stats;
        let fields = [
            csv_field(&report.student.name).into_owned(),
            csv_field(&report.center_name).into_owned(),
            stats.present.to_string(),
            stats.absent.to_string(),
            stats.late.to_string(),
            stats.excused.to_string(),
            stats.total.to_string(),
            format!("{}%", report.rate()),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// `attendance-report-<from|all>-to-<to|all>.csv`
pub fn report_file_name(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> String {
    format!(
        "attendance-report-{}-to-{}.csv",
        date_label(date_from),
        date_label(date_to)
    )
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map_or_else(
        || "all".to_string(),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
