//! Core data layer for the AttendX attendance tracker.
//! This crate owns persistence, cascade/upsert rules and attendance aggregates.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod transfer;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{AttendanceRecord, AttendanceStatus, MarkAttendance, RecordId};
pub use model::center::{Center, CenterId, CenterPatch, NewCenter, CENTER_COLORS};
pub use model::settings::{AppSettings, SettingsPatch, Theme, DEFAULT_LANGUAGE};
pub use model::student::{NewStudent, Student, StudentId, StudentPatch, StudentStatus};
pub use repo::attendance_repo::{
    AttendanceListQuery, AttendanceRepository, MarkOutcome, SqliteAttendanceRepository,
};
pub use repo::center_repo::{CenterDeletion, CenterRepository, SqliteCenterRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::student_repo::{
    SqliteStudentRepository, StudentDeletion, StudentListQuery, StudentRepository,
};
pub use service::dashboard_service::{CenterOverview, DashboardService, DashboardSummary};
pub use service::report_service::{ReportQuery, ReportService, ReportSummary, StudentReport};
pub use service::sheet_service::{AttendanceSheet, SheetEntry, SheetService, SheetSummary};
pub use service::stats::AttendanceStats;
pub use store::AttendanceStore;
pub use transfer::csv_report::{export_csv, report_file_name, CSV_HEADERS};
pub use transfer::snapshot::{
    backup_file_name, export_all_data, import_data, ImportSummary, Snapshot,
};
pub use transfer::TransferError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
