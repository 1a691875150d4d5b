//! Attendance repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist attendance records with upsert semantics on `(student_id, date)`.
//! - Answer per-center, per-student and per-date record queries.
//!
//! # Invariants
//! - `mark_attendance` never creates a second record for an existing
//!   `(student_id, date)` pair; it rewrites `status` and `notes` in place.
//! - Bulk marking applies every upsert or none of them.
//! - Record lists are ordered by `date DESC, id ASC`.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus, MarkAttendance, RecordId};
use crate::model::center::CenterId;
use crate::model::student::StudentId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::support::{
    date_to_db, ensure_connection_ready, now_utc, parse_date, parse_timestamp, timestamp_to_db,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    center_id,
    date,
    status,
    notes,
    created_at
FROM attendance";

/// Filter options for listing attendance records.
///
/// `date` is an exact match; `date_from`/`date_to` form an inclusive range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceListQuery {
    pub center_id: Option<CenterId>,
    pub student_id: Option<StudentId>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AttendanceListQuery {
    pub fn for_center_on(center_id: CenterId, date: NaiveDate) -> Self {
        Self {
            center_id: Some(center_id),
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn for_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            ..Self::default()
        }
    }

    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }
}

/// Result of one upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Inserted(RecordId),
    Updated(RecordId),
}

impl MarkOutcome {
    pub fn record_id(self) -> RecordId {
        match self {
            Self::Inserted(id) | Self::Updated(id) => id,
        }
    }
}

/// Repository interface for attendance persistence.
pub trait AttendanceRepository {
    /// Upserts one record keyed on `(student_id, date)`.
    fn mark_attendance(&self, mark: &MarkAttendance) -> RepoResult<MarkOutcome>;
    /// Upserts all marks in order inside one transaction.
    fn mark_many(&self, marks: &[MarkAttendance]) -> RepoResult<Vec<MarkOutcome>>;
    fn find_record(
        &self,
        student_id: StudentId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>>;
    fn list_records(&self, query: &AttendanceListQuery) -> RepoResult<Vec<AttendanceRecord>>;
    /// Inserts a record verbatim, keeping its id and timestamp.
    fn insert_record(&self, record: &AttendanceRecord) -> RepoResult<()>;
    fn clear_records(&self) -> RepoResult<usize>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after verifying the `attendance` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "attendance",
            &[
                "id",
                "student_id",
                "center_id",
                "date",
                "status",
                "notes",
                "created_at",
            ],
        )?;
        Ok(Self::new(conn))
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn mark_attendance(&self, mark: &MarkAttendance) -> RepoResult<MarkOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = upsert_record(&tx, mark)?;
        tx.commit()?;
        Ok(outcome)
    }

    fn mark_many(&self, marks: &[MarkAttendance]) -> RepoResult<Vec<MarkOutcome>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcomes = marks
            .iter()
            .map(|mark| upsert_record(&tx, mark))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(outcomes)
    }

    fn find_record(
        &self,
        student_id: StudentId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE student_id = ?1
               AND date = ?2
             ORDER BY id ASC
             LIMIT 1;"
        ))?;
        let row = stmt
            .query_row(params![student_id, date_to_db(date)], |row| {
                Ok(parse_record_row(row))
            })
            .optional()?;
        row.transpose()
    }

    fn list_records(&self, query: &AttendanceListQuery) -> RepoResult<Vec<AttendanceRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(center_id) = query.center_id {
            sql.push_str(" AND center_id = ?");
            bind_values.push(Value::Integer(center_id));
        }
        if let Some(student_id) = query.student_id {
            sql.push_str(" AND student_id = ?");
            bind_values.push(Value::Integer(student_id));
        }
        if let Some(date) = query.date {
            sql.push_str(" AND date = ?");
            bind_values.push(Value::Text(date_to_db(date)));
        }
        if let Some(date_from) = query.date_from {
            sql.push_str(" AND date >= ?");
            bind_values.push(Value::Text(date_to_db(date_from)));
        }
        if let Some(date_to) = query.date_to {
            sql.push_str(" AND date <= ?");
            bind_values.push(Value::Text(date_to_db(date_to)));
        }
        sql.push_str(" ORDER BY date DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn insert_record(&self, record: &AttendanceRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO attendance (
                id,
                student_id,
                center_id,
                date,
                status,
                notes,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                record.id,
                record.student_id,
                record.center_id,
                date_to_db(record.date),
                record.status.as_str(),
                record.notes.as_deref(),
                timestamp_to_db(&record.created_at),
            ],
        )?;
        Ok(())
    }

    fn clear_records(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM attendance;", [])?)
    }
}

fn upsert_record(conn: &Connection, mark: &MarkAttendance) -> RepoResult<MarkOutcome> {
    let date = date_to_db(mark.date);
    let existing: Option<RecordId> = conn
        .query_row(
            "SELECT id
             FROM attendance
             WHERE student_id = ?1
               AND date = ?2
             ORDER BY id ASC
             LIMIT 1;",
            params![mark.student_id, date.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE attendance
             SET
                status = ?2,
                notes = ?3
             WHERE id = ?1;",
            params![id, mark.status.as_str(), mark.notes.as_deref()],
        )?;
        return Ok(MarkOutcome::Updated(id));
    }

    conn.execute(
        "INSERT INTO attendance (
            student_id,
            center_id,
            date,
            status,
            notes,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            mark.student_id,
            mark.center_id,
            date.as_str(),
            mark.status.as_str(),
            mark.notes.as_deref(),
            timestamp_to_db(&now_utc()),
        ],
    )?;
    Ok(MarkOutcome::Inserted(conn.last_insert_rowid()))
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let date_text: String = row.get("date")?;
    let status_text: String = row.get("status")?;
    let status = AttendanceStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid attendance status `{status_text}` in attendance.status"
        ))
    })?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        center_id: row.get("center_id")?,
        date: parse_date(&date_text, "attendance.date")?,
        status,
        notes: row.get("notes")?,
        created_at: parse_timestamp(row.get("created_at")?, "attendance.created_at")?,
    })
}
