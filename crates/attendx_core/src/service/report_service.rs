//! Per-student attendance reports.
//!
//! # Responsibility
//! - Join students with their center and attendance tallies.
//! - Apply the report filters (center, inclusive date range).
//!
//! # Invariants
//! - Every student matching the center filter yields one row, even with no
//!   records in range.
//! - A student's tally counts all of that student's records in range,
//!   whichever center they were marked under.

use crate::model::center::{Center, CenterId};
use crate::model::student::{Student, StudentId};
use crate::repo::attendance_repo::AttendanceListQuery;
use crate::repo::error::RepoResult;
use crate::service::stats::{mean_rate, AttendanceStats};
use crate::store::AttendanceStore;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// Center label used when a student's center no longer exists.
pub const UNKNOWN_CENTER_NAME: &str = "Unknown";
/// Center color used when a student's center no longer exists.
pub const UNKNOWN_CENTER_COLOR: &str = "#6b6b7d";

/// Report filters. `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub center_id: Option<CenterId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ReportQuery {
    /// The default report window: from `days` days before `today` through
    /// `today`, both inclusive (`days + 1` calendar dates).
    pub fn trailing_days(today: NaiveDate, days: u64) -> Self {
        Self {
            center_id: None,
            date_from: today.checked_sub_days(Days::new(days)),
            date_to: Some(today),
        }
    }

    pub fn with_center(mut self, center_id: CenterId) -> Self {
        self.center_id = Some(center_id);
        self
    }
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentReport {
    pub student: Student,
    pub center_name: String,
    pub center_color: String,
    pub stats: AttendanceStats,
}

impl StudentReport {
    pub fn rate(&self) -> u32 {
        self.stats.rate()
    }
}

/// Totals shown above the report table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_sessions: u64,
    /// Rounded mean of the per-student rates.
    pub average_rate: u32,
}

impl ReportSummary {
    pub fn from_reports(reports: &[StudentReport]) -> Self {
        Self {
            total_sessions: reports.iter().map(|report| report.stats.total).sum(),
            average_rate: mean_rate(reports.iter().map(StudentReport::rate)),
        }
    }
}

/// Read-only report builder over a store.
pub struct ReportService<'store> {
    store: &'store AttendanceStore,
}

impl<'store> ReportService<'store> {
    pub fn new(store: &'store AttendanceStore) -> Self {
        Self { store }
    }

    /// Builds one row per student (ordered by name) matching `query`.
    pub fn student_reports(&self, query: &ReportQuery) -> RepoResult<Vec<StudentReport>> {
        let centers: HashMap<CenterId, Center> = self
            .store
            .get_all_centers()?
            .into_iter()
            .map(|center| (center.id, center))
            .collect();

        let records = self.store.find_attendance(&AttendanceListQuery {
            date_from: query.date_from,
            date_to: query.date_to,
            ..AttendanceListQuery::default()
        })?;
        let mut tallies: HashMap<StudentId, AttendanceStats> = HashMap::new();
        for record in records {
            tallies
                .entry(record.student_id)
                .or_default()
                .record(record.status);
        }

        let reports = self
            .store
            .get_all_students()?
            .into_iter()
            .filter(|student| {
                query
                    .center_id
                    .map_or(true, |center_id| student.center_id == center_id)
            })
            .map(|student| {
                let (center_name, center_color) = match centers.get(&student.center_id) {
                    Some(center) => (center.name.clone(), center.color.clone()),
                    None => (
                        UNKNOWN_CENTER_NAME.to_string(),
                        UNKNOWN_CENTER_COLOR.to_string(),
                    ),
                };
                let stats = tallies.get(&student.id).copied().unwrap_or_default();
                StudentReport {
                    student,
                    center_name,
                    center_color,
                    stats,
                }
            })
            .collect();

        Ok(reports)
    }
}
