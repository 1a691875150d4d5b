//! Full-store JSON snapshot export and destructive import.
//!
//! # Invariants
//! - Export captures every row of every collection; ids are preserved.
//! - Import parses the whole payload before touching storage.
//! - Each collection present in the payload is cleared and refilled verbatim;
//!   absent collections are left as they are.
//! - All replacements commit together or not at all.

use crate::model::attendance::AttendanceRecord;
use crate::model::center::Center;
use crate::model::settings::AppSettings;
use crate::model::student::Student;
use crate::repo::attendance_repo::{
    AttendanceListQuery, AttendanceRepository, SqliteAttendanceRepository,
};
use crate::repo::center_repo::{CenterRepository, SqliteCenterRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentListQuery, StudentRepository};
use crate::store::AttendanceStore;
use crate::transfer::TransferError;
use chrono::NaiveDate;
use log::{error, info};
use rusqlite::{Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

const BACKUP_FILE_PREFIX: &str = "attendx-backup";

/// Portable snapshot document.
///
/// On export every collection is populated (`settings` only when saved). On
/// import a missing or `null` key means "leave that collection alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centers: Option<Vec<Center>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Student>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<AttendanceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
}

impl Snapshot {
    fn is_empty(&self) -> bool {
        self.centers.is_none()
            && self.students.is_none()
            && self.attendance.is_none()
            && self.settings.is_none()
    }
}

/// Rows written per collection by an import. `None` means untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub centers: Option<usize>,
    pub students: Option<usize>,
    pub attendance: Option<usize>,
    pub settings_replaced: bool,
}

/// Reads every collection into a snapshot, rows ordered by id.
pub fn capture_snapshot(store: &AttendanceStore) -> Result<Snapshot, TransferError> {
    let conn = store.connection();

    let mut centers = SqliteCenterRepository::new(conn).list_centers()?;
    centers.sort_by_key(|center| center.id);

    let mut students =
        SqliteStudentRepository::new(conn).list_students(&StudentListQuery::default())?;
    students.sort_by_key(|student| student.id);

    let mut attendance =
        SqliteAttendanceRepository::new(conn).list_records(&AttendanceListQuery::default())?;
    attendance.sort_by_key(|record| record.id);

    let settings = SqliteSettingsRepository::new(conn).get_settings()?;

    Ok(Snapshot {
        centers: Some(centers),
        students: Some(students),
        attendance: Some(attendance),
        settings,
    })
}

/// Serializes the whole store as pretty-printed JSON.
pub fn export_all_data(store: &AttendanceStore) -> Result<String, TransferError> {
    let snapshot = capture_snapshot(store)?;
    let json = serde_json::to_string_pretty(&snapshot).map_err(TransferError::Serialize)?;
    info!(
        "event=data_export module=transfer status=ok centers={} students={} records={} settings={}",
        snapshot.centers.as_ref().map_or(0, Vec::len),
        snapshot.students.as_ref().map_or(0, Vec::len),
        snapshot.attendance.as_ref().map_or(0, Vec::len),
        snapshot.settings.is_some()
    );
    Ok(json)
}

/// Parses `json` and replaces the collections it names.
///
/// Rows are written as given except `createdAt`, which is stored with
/// millisecond precision; finer fractions are truncated.
///
/// # Errors
/// - `MalformedPayload` / `EmptyPayload` before any collection is modified.
///   Anything other than a JSON object is malformed.
/// - `Repo` when a write fails (for example a duplicate id in the payload);
///   the transaction is rolled back and the store is unchanged.
pub fn import_data(store: &AttendanceStore, json: &str) -> Result<ImportSummary, TransferError> {
    let snapshot = parse_snapshot(json).map_err(|err| {
        error!(
            "event=data_import module=transfer status=error error_code=malformed_payload line={} column={}",
            err.line(),
            err.column()
        );
        TransferError::MalformedPayload(err)
    })?;
    if snapshot.is_empty() {
        error!("event=data_import module=transfer status=error error_code=empty_payload");
        return Err(TransferError::EmptyPayload);
    }

    match restore_snapshot(store, &snapshot) {
        Ok(summary) => {
            info!(
                "event=data_import module=transfer status=ok centers={:?} students={:?} records={:?} settings_replaced={}",
                summary.centers, summary.students, summary.attendance, summary.settings_replaced
            );
            Ok(summary)
        }
        Err(err) => {
            error!(
                "event=data_import module=transfer status=error error_code=restore_failed error={err}"
            );
            Err(err)
        }
    }
}

/// Replaces collections from an already-parsed snapshot in one transaction.
pub fn restore_snapshot(
    store: &AttendanceStore,
    snapshot: &Snapshot,
) -> Result<ImportSummary, TransferError> {
    let tx = Transaction::new_unchecked(store.connection(), TransactionBehavior::Immediate)?;
    let mut summary = ImportSummary::default();

    if let Some(centers) = &snapshot.centers {
        let repo = SqliteCenterRepository::new(&tx);
        repo.clear_centers()?;
        for center in centers {
            repo.insert_center(center)?;
        }
        summary.centers = Some(centers.len());
    }

    if let Some(students) = &snapshot.students {
        let repo = SqliteStudentRepository::new(&tx);
        repo.clear_students()?;
        for student in students {
            repo.insert_student(student)?;
        }
        summary.students = Some(students.len());
    }

    if let Some(records) = &snapshot.attendance {
        let repo = SqliteAttendanceRepository::new(&tx);
        repo.clear_records()?;
        for record in records {
            repo.insert_record(record)?;
        }
        summary.attendance = Some(records.len());
    }

    if let Some(settings) = &snapshot.settings {
        let repo = SqliteSettingsRepository::new(&tx);
        repo.clear_settings()?;
        repo.put_settings(settings)?;
        summary.settings_replaced = true;
    }

    tx.commit()?;
    Ok(summary)
}

// Derived `Deserialize` also accepts a sequence in field order, so the
// top-level shape is checked before conversion.
fn parse_snapshot(json: &str) -> Result<Snapshot, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom(
            "snapshot payload must be a JSON object",
        ));
    }
    serde_json::from_value(value)
}

/// `attendx-backup-<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_FILE_PREFIX}-{}.json", date.format("%Y-%m-%d"))
}
