//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist students and answer roster queries.
//! - Own the student cascade delete (attendance, then student).
//!
//! # Invariants
//! - Student lists are ordered by `name ASC, id ASC` (binary collation).
//! - `center_id` is stored as given; no existence check is made.

use crate::model::center::CenterId;
use crate::model::student::{NewStudent, Student, StudentId, StudentPatch, StudentStatus};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::support::{
    count_to_u64, ensure_connection_ready, now_utc, parse_timestamp, timestamp_to_db,
};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    center_id,
    phone,
    parent_phone,
    notes,
    status,
    created_at
FROM students";

/// Filter options shared by student listing and counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListQuery {
    pub center_id: Option<CenterId>,
    pub status: Option<StudentStatus>,
    /// Substring of the name (ASCII case-insensitive), phone or parent phone.
    /// Empty matches everyone.
    pub search: Option<String>,
}

impl StudentListQuery {
    pub fn for_center(center_id: CenterId) -> Self {
        Self {
            center_id: Some(center_id),
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self {
            status: Some(StudentStatus::Active),
            ..Self::default()
        }
    }

    pub fn active_in_center(center_id: CenterId) -> Self {
        Self {
            center_id: Some(center_id),
            status: Some(StudentStatus::Active),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut bind_values = Vec::new();
        if let Some(center_id) = self.center_id {
            sql.push_str(" AND center_id = ?");
            bind_values.push(Value::Integer(center_id));
        }
        if let Some(status) = self.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(term) = self.search.as_deref().filter(|term| !term.is_empty()) {
            // Phones match case-sensitively; names fold ASCII case.
            sql.push_str(
                " AND (instr(lower(name), ?) > 0 OR instr(phone, ?) > 0 OR instr(parent_phone, ?) > 0)",
            );
            bind_values.push(Value::Text(term.to_ascii_lowercase()));
            bind_values.push(Value::Text(term.to_string()));
            bind_values.push(Value::Text(term.to_string()));
        }
        (sql, bind_values)
    }
}

/// Row counts removed by a student cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentDeletion {
    pub records_deleted: usize,
    pub student_deleted: bool,
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts a new student stamped with the current time.
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    fn count_students(&self, query: &StudentListQuery) -> RepoResult<u64>;
    /// Merges `patch` into the stored student. Returns `false` when missing.
    fn update_student(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<bool>;
    fn delete_student_cascade(&self, id: StudentId) -> RepoResult<StudentDeletion>;
    /// Inserts a student verbatim, keeping its id and timestamp.
    fn insert_student(&self, student: &Student) -> RepoResult<()>;
    fn clear_students(&self) -> RepoResult<usize>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after verifying the `students` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "students",
            &[
                "id",
                "name",
                "center_id",
                "phone",
                "parent_phone",
                "notes",
                "status",
                "created_at",
            ],
        )?;
        Ok(Self::new(conn))
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        self.conn.execute(
            "INSERT INTO students (
                name,
                center_id,
                phone,
                parent_phone,
                notes,
                status,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                student.name.as_str(),
                student.center_id,
                student.phone.as_deref(),
                student.parent_phone.as_deref(),
                student.notes.as_deref(),
                student.status.as_str(),
                timestamp_to_db(&now_utc()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        load_student(self.conn, id)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let (where_sql, bind_values) = query.where_clause();
        let sql = format!("{STUDENT_SELECT_SQL}{where_sql} ORDER BY name ASC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn count_students(&self, query: &StudentListQuery) -> RepoResult<u64> {
        let (where_sql, bind_values) = query.where_clause();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM students{where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        count_to_u64(count)
    }

    fn update_student(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(mut student) = load_student(&tx, id)? else {
            return Ok(false);
        };
        patch.apply_to(&mut student);

        tx.execute(
            "UPDATE students
             SET
                name = ?2,
                center_id = ?3,
                phone = ?4,
                parent_phone = ?5,
                notes = ?6,
                status = ?7
             WHERE id = ?1;",
            params![
                id,
                student.name.as_str(),
                student.center_id,
                student.phone.as_deref(),
                student.parent_phone.as_deref(),
                student.notes.as_deref(),
                student.status.as_str(),
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn delete_student_cascade(&self, id: StudentId) -> RepoResult<StudentDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let records_deleted = tx.execute("DELETE FROM attendance WHERE student_id = ?1;", [id])?;
        let student_deleted = tx.execute("DELETE FROM students WHERE id = ?1;", [id])? > 0;
        tx.commit()?;

        Ok(StudentDeletion {
            records_deleted,
            student_deleted,
        })
    }

    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO students (
                id,
                name,
                center_id,
                phone,
                parent_phone,
                notes,
                status,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                student.id,
                student.name.as_str(),
                student.center_id,
                student.phone.as_deref(),
                student.parent_phone.as_deref(),
                student.notes.as_deref(),
                student.status.as_str(),
                timestamp_to_db(&student.created_at),
            ],
        )?;
        Ok(())
    }

    fn clear_students(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM students;", [])?)
    }
}

fn load_student(conn: &Connection, id: StudentId) -> RepoResult<Option<Student>> {
    let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id], |row| Ok(parse_student_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let status_text: String = row.get("status")?;
    let status = StudentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid student status `{status_text}` in students.status"
        ))
    })?;

    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        center_id: row.get("center_id")?,
        phone: row.get("phone")?,
        parent_phone: row.get("parent_phone")?,
        notes: row.get("notes")?,
        status,
        created_at: parse_timestamp(row.get("created_at")?, "students.created_at")?,
    })
}
