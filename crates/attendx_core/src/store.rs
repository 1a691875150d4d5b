//! Attendance data store.
//!
//! # Responsibility
//! - Own the SQLite connection holding centers, students, attendance and
//!   settings.
//! - Expose the use-case level operations callers depend on, delegating SQL
//!   to the collection repositories.
//! - Emit metadata-only log events for every mutation.
//!
//! # Invariants
//! - The store is an explicit value owned by the application root; there is
//!   no process-wide instance. Each `open_in_memory` call is isolated.
//! - Missing rows are reported as `None`/`false`, never as errors.
//! - Foreign-key-like arguments are accepted without existence checks.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, MarkAttendance};
use crate::model::center::{Center, CenterId, CenterPatch, NewCenter};
use crate::model::settings::{AppSettings, SettingsPatch};
use crate::model::student::{NewStudent, Student, StudentId, StudentPatch};
use crate::repo::attendance_repo::{
    AttendanceListQuery, AttendanceRepository, MarkOutcome, SqliteAttendanceRepository,
};
use crate::repo::center_repo::{CenterDeletion, CenterRepository, SqliteCenterRepository};
use crate::repo::error::RepoResult;
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::student_repo::{
    SqliteStudentRepository, StudentDeletion, StudentListQuery, StudentRepository,
};
use crate::service::stats::AttendanceStats;
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;

/// Handle over one attendance database.
pub struct AttendanceStore {
    conn: Connection,
}

impl AttendanceStore {
    /// Opens (or creates) a file-backed store and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an existing connection after checking every collection schema.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        let _ = SqliteCenterRepository::try_new(&conn)?;
        let _ = SqliteStudentRepository::try_new(&conn)?;
        let _ = SqliteAttendanceRepository::try_new(&conn)?;
        let _ = SqliteSettingsRepository::try_new(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for adapters that need a cross-collection
    /// transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn centers(&self) -> SqliteCenterRepository<'_> {
        SqliteCenterRepository::new(&self.conn)
    }

    fn students(&self) -> SqliteStudentRepository<'_> {
        SqliteStudentRepository::new(&self.conn)
    }

    fn attendance(&self) -> SqliteAttendanceRepository<'_> {
        SqliteAttendanceRepository::new(&self.conn)
    }

    fn settings(&self) -> SqliteSettingsRepository<'_> {
        SqliteSettingsRepository::new(&self.conn)
    }

    // Centers

    /// Adds a center and returns its new id. Empty names are accepted.
    pub fn add_center(&self, center: &NewCenter) -> RepoResult<CenterId> {
        let id = self.centers().create_center(center)?;
        info!("event=center_add module=store status=ok center_id={id}");
        Ok(id)
    }

    /// All centers, newest first.
    pub fn get_all_centers(&self) -> RepoResult<Vec<Center>> {
        self.centers().list_centers()
    }

    /// Centers whose name or address contains `term`, newest first.
    pub fn search_centers(&self, term: &str) -> RepoResult<Vec<Center>> {
        self.centers().search_centers(term)
    }

    pub fn get_center_by_id(&self, id: CenterId) -> RepoResult<Option<Center>> {
        self.centers().get_center(id)
    }

    /// Merges `patch` into the center. Returns `false` when `id` is unknown.
    pub fn update_center(&self, id: CenterId, patch: &CenterPatch) -> RepoResult<bool> {
        let updated = self.centers().update_center(id, patch)?;
        info!("event=center_update module=store status=ok center_id={id} matched={updated}");
        Ok(updated)
    }

    /// Deletes the center together with its students and attendance records.
    pub fn delete_center(&self, id: CenterId) -> RepoResult<CenterDeletion> {
        let deletion = self.centers().delete_center_cascade(id)?;
        info!(
            "event=center_delete module=store status=ok center_id={id} center_deleted={} students_deleted={} records_deleted={}",
            deletion.center_deleted, deletion.students_deleted, deletion.records_deleted
        );
        Ok(deletion)
    }

    // Students

    /// Enrolls a student and returns the new id.
    pub fn add_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        let id = self.students().create_student(student)?;
        info!(
            "event=student_add module=store status=ok student_id={id} center_id={}",
            student.center_id
        );
        Ok(id)
    }

    /// All students ordered by name.
    pub fn get_all_students(&self) -> RepoResult<Vec<Student>> {
        self.students().list_students(&StudentListQuery::default())
    }

    /// Students of any status enrolled at `center_id`.
    pub fn get_students_by_center(&self, center_id: CenterId) -> RepoResult<Vec<Student>> {
        self.students()
            .list_students(&StudentListQuery::for_center(center_id))
    }

    pub fn get_active_students_by_center(&self, center_id: CenterId) -> RepoResult<Vec<Student>> {
        self.students()
            .list_students(&StudentListQuery::active_in_center(center_id))
    }

    /// Students matching an arbitrary filter, ordered by name.
    pub fn find_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        self.students().list_students(query)
    }

    pub fn get_student_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.students().get_student(id)
    }

    /// Merges `patch` into the student. Returns `false` when `id` is unknown.
    pub fn update_student(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<bool> {
        let updated = self.students().update_student(id, patch)?;
        info!("event=student_update module=store status=ok student_id={id} matched={updated}");
        Ok(updated)
    }

    /// Deletes the student and every attendance record of that student.
    pub fn delete_student(&self, id: StudentId) -> RepoResult<StudentDeletion> {
        let deletion = self.students().delete_student_cascade(id)?;
        info!(
            "event=student_delete module=store status=ok student_id={id} student_deleted={} records_deleted={}",
            deletion.student_deleted, deletion.records_deleted
        );
        Ok(deletion)
    }

    // Attendance

    /// Records `status` for the student on `date`, replacing an earlier mark
    /// for the same day instead of adding a second record.
    pub fn mark_attendance(
        &self,
        student_id: StudentId,
        center_id: CenterId,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> RepoResult<()> {
        let mark = MarkAttendance {
            student_id,
            center_id,
            date,
            status,
            notes: notes.map(str::to_string),
        };
        let outcome = self.attendance().mark_attendance(&mark)?;
        log_mark_outcome(outcome);
        Ok(())
    }

    /// Applies several marks atomically, in order. Returns the number applied.
    pub fn bulk_mark_attendance(&self, marks: &[MarkAttendance]) -> RepoResult<usize> {
        let outcomes = self.attendance().mark_many(marks)?;
        let updated = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, MarkOutcome::Updated(_)))
            .count();
        info!(
            "event=attendance_bulk_mark module=store status=ok marks={} inserted={} updated={updated}",
            outcomes.len(),
            outcomes.len() - updated
        );
        Ok(outcomes.len())
    }

    /// Records of one center on exactly `date`.
    pub fn get_attendance_by_date(
        &self,
        center_id: CenterId,
        date: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        self.attendance()
            .list_records(&AttendanceListQuery::for_center_on(center_id, date))
    }

    /// Records of one student, most recent date first.
    pub fn get_attendance_by_student(
        &self,
        student_id: StudentId,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        self.attendance()
            .list_records(&AttendanceListQuery::for_student(student_id))
    }

    /// Records matching an arbitrary filter.
    pub fn find_attendance(&self, query: &AttendanceListQuery) -> RepoResult<Vec<AttendanceRecord>> {
        self.attendance().list_records(query)
    }

    // Statistics

    /// Number of active students across all centers.
    pub fn get_student_count(&self) -> RepoResult<u64> {
        self.students().count_students(&StudentListQuery::active())
    }

    pub fn get_center_count(&self) -> RepoResult<u64> {
        self.centers().count_centers()
    }

    /// Number of students of any status at `center_id`.
    pub fn get_student_count_by_center(&self, center_id: CenterId) -> RepoResult<u64> {
        self.students()
            .count_students(&StudentListQuery::for_center(center_id))
    }

    /// Number of active students at `center_id`.
    pub fn get_active_student_count_by_center(&self, center_id: CenterId) -> RepoResult<u64> {
        self.students()
            .count_students(&StudentListQuery::active_in_center(center_id))
    }

    /// Per-status tally of every record on `date`, across all centers.
    pub fn get_today_attendance_stats(&self, date: NaiveDate) -> RepoResult<AttendanceStats> {
        let records = self
            .attendance()
            .list_records(&AttendanceListQuery::on_date(date))?;
        Ok(AttendanceStats::from_statuses(
            records.into_iter().map(|record| record.status),
        ))
    }

    /// Share of the student's records marked present or late, in whole percent.
    pub fn get_attendance_rate_for_student(&self, student_id: StudentId) -> RepoResult<u32> {
        let records = self.get_attendance_by_student(student_id)?;
        Ok(AttendanceStats::from_statuses(records.into_iter().map(|record| record.status)).rate())
    }

    // Settings

    pub fn get_settings(&self) -> RepoResult<Option<AppSettings>> {
        self.settings().get_settings()
    }

    /// Merge-upserts the settings singleton and returns the stored value.
    pub fn save_settings(&self, patch: &SettingsPatch) -> RepoResult<AppSettings> {
        let settings = self.settings().save_settings(patch)?;
        info!(
            "event=settings_save module=store status=ok theme={} language={}",
            settings.theme.as_str(),
            settings.language
        );
        Ok(settings)
    }

    /// Empties all four collections in one transaction.
    pub fn clear_all_data(&self) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let records = SqliteAttendanceRepository::new(&tx).clear_records()?;
        let students = SqliteStudentRepository::new(&tx).clear_students()?;
        let centers = SqliteCenterRepository::new(&tx).clear_centers()?;
        SqliteSettingsRepository::new(&tx).clear_settings()?;
        tx.commit()?;

        info!(
            "event=store_clear module=store status=ok centers_deleted={centers} students_deleted={students} records_deleted={records}"
        );
        Ok(())
    }
}

fn log_mark_outcome(outcome: MarkOutcome) {
    match outcome {
        MarkOutcome::Inserted(id) => {
            debug!("event=attendance_mark module=store status=ok action=insert record_id={id}")
        }
        MarkOutcome::Updated(id) => {
            debug!("event=attendance_mark module=store status=ok action=update record_id={id}")
        }
    }
}
