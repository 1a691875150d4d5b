//! SQLite helpers shared by the collection repositories.
//!
//! # Responsibility
//! - Verify a connection carries the expected schema before repositories use it.
//! - Convert timestamps, dates and counts between domain and column types.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checks schema version, table and columns for one repository.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Current time truncated to the millisecond precision kept in storage.
pub(crate) fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn timestamp_to_db(value: &DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn parse_timestamp(value: i64, column: &'static str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str, column: &'static str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn count_to_u64(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative count `{value}`")))
}

#[cfg(test)]
mod tests {
    use super::{date_to_db, parse_date, parse_timestamp, timestamp_to_db};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn dates_use_iso_calendar_form() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_to_db(date), "2024-01-05");
        assert_eq!(parse_date("2024-01-05", "attendance.date").unwrap(), date);
        assert!(parse_date("2024-1-5T00:00", "attendance.date").is_err());
    }

    #[test]
    fn timestamps_are_stored_as_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_704_067_200_123).unwrap();
        let stored = timestamp_to_db(&at);
        assert_eq!(stored, 1_704_067_200_123);
        assert_eq!(parse_timestamp(stored, "centers.created_at").unwrap(), at);
    }
}
