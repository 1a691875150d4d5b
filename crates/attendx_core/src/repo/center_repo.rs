//! Center repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist centers and answer center-level queries.
//! - Own the center cascade delete (students, attendance, center).
//!
//! # Invariants
//! - Listing order is newest first (`created_at DESC, id DESC`).
//! - Cascade delete runs in a single transaction; afterwards no student or
//!   attendance row references the deleted center id.

use crate::model::center::{Center, CenterId, CenterPatch, NewCenter};
use crate::repo::error::RepoResult;
use crate::repo::support::{
    count_to_u64, ensure_connection_ready, now_utc, parse_timestamp, timestamp_to_db,
};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const CENTER_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    color,
    created_at
FROM centers";

/// Row counts removed by a center cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CenterDeletion {
    pub students_deleted: usize,
    pub records_deleted: usize,
    pub center_deleted: bool,
}

/// Repository interface for center persistence.
pub trait CenterRepository {
    /// Inserts a new center stamped with the current time.
    fn create_center(&self, center: &NewCenter) -> RepoResult<CenterId>;
    fn get_center(&self, id: CenterId) -> RepoResult<Option<Center>>;
    /// Lists every center, newest first.
    fn list_centers(&self) -> RepoResult<Vec<Center>>;
    /// Centers whose name or address contains `term`, ASCII case-insensitive,
    /// newest first. An empty term matches every center.
    fn search_centers(&self, term: &str) -> RepoResult<Vec<Center>>;
    /// Merges `patch` into the stored center. Returns `false` when missing.
    fn update_center(&self, id: CenterId, patch: &CenterPatch) -> RepoResult<bool>;
    fn delete_center_cascade(&self, id: CenterId) -> RepoResult<CenterDeletion>;
    fn count_centers(&self) -> RepoResult<u64>;
    /// Inserts a center verbatim, keeping its id and timestamp.
    fn insert_center(&self, center: &Center) -> RepoResult<()>;
    /// Removes every center without touching dependent rows.
    fn clear_centers(&self) -> RepoResult<usize>;
}

/// SQLite-backed center repository.
pub struct SqliteCenterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCenterRepository<'conn> {
    /// Wraps a connection the caller already knows to be migrated.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after verifying the `centers` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "centers",
            &["id", "name", "address", "color", "created_at"],
        )?;
        Ok(Self::new(conn))
    }
}

impl CenterRepository for SqliteCenterRepository<'_> {
    fn create_center(&self, center: &NewCenter) -> RepoResult<CenterId> {
        self.conn.execute(
            "INSERT INTO centers (name, address, color, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                center.name.as_str(),
                center.address.as_deref(),
                center.color.as_str(),
                timestamp_to_db(&now_utc()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_center(&self, id: CenterId) -> RepoResult<Option<Center>> {
        load_center(self.conn, id)
    }

    fn list_centers(&self) -> RepoResult<Vec<Center>> {
        query_centers(self.conn, "", None)
    }

    fn search_centers(&self, term: &str) -> RepoResult<Vec<Center>> {
        if term.is_empty() {
            return self.list_centers();
        }
        query_centers(
            self.conn,
            " WHERE instr(lower(name), ?1) > 0 OR instr(lower(address), ?1) > 0",
            Some(term.to_ascii_lowercase()),
        )
    }

    fn update_center(&self, id: CenterId, patch: &CenterPatch) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(mut center) = load_center(&tx, id)? else {
            return Ok(false);
        };
        patch.apply_to(&mut center);

        tx.execute(
            "UPDATE centers
             SET
                name = ?2,
                address = ?3,
                color = ?4
             WHERE id = ?1;",
            params![
                id,
                center.name.as_str(),
                center.address.as_deref(),
                center.color.as_str(),
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn delete_center_cascade(&self, id: CenterId) -> RepoResult<CenterDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let students_deleted = tx.execute("DELETE FROM students WHERE center_id = ?1;", [id])?;
        let records_deleted = tx.execute("DELETE FROM attendance WHERE center_id = ?1;", [id])?;
        let center_deleted = tx.execute("DELETE FROM centers WHERE id = ?1;", [id])? > 0;
        tx.commit()?;

        Ok(CenterDeletion {
            students_deleted,
            records_deleted,
            center_deleted,
        })
    }

    fn count_centers(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM centers;", [], |row| row.get(0))?;
        count_to_u64(count)
    }

    fn insert_center(&self, center: &Center) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO centers (id, name, address, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                center.id,
                center.name.as_str(),
                center.address.as_deref(),
                center.color.as_str(),
                timestamp_to_db(&center.created_at),
            ],
        )?;
        Ok(())
    }

    fn clear_centers(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM centers;", [])?)
    }
}

fn query_centers(
    conn: &Connection,
    where_sql: &str,
    term: Option<String>,
) -> RepoResult<Vec<Center>> {
    let mut stmt = conn.prepare(&format!(
        "{CENTER_SELECT_SQL}{where_sql} ORDER BY created_at DESC, id DESC;"
    ))?;
    let mut rows = stmt.query(params_from_iter(term))?;
    let mut centers = Vec::new();
    while let Some(row) = rows.next()? {
        centers.push(parse_center_row(row)?);
    }
    Ok(centers)
}

fn load_center(conn: &Connection, id: CenterId) -> RepoResult<Option<Center>> {
    let mut stmt = conn.prepare(&format!("{CENTER_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id], |row| Ok(parse_center_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_center_row(row: &Row<'_>) -> RepoResult<Center> {
    let created_at = parse_timestamp(row.get("created_at")?, "centers.created_at")?;
    Ok(Center {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        color: row.get("color")?,
        created_at,
    })
}
