//! Settings repository contract and SQLite implementation.
//!
//! # Invariants
//! - At most one settings row exists (`id = 1`).
//! - Defaults are applied only when the row is first created; later saves
//!   merge the patch into the stored values.

use crate::model::settings::{AppSettings, SettingsPatch, Theme};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::support::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const SETTINGS_ROW_ID: i64 = 1;

/// Repository interface for the settings singleton.
pub trait SettingsRepository {
    fn get_settings(&self) -> RepoResult<Option<AppSettings>>;
    /// Merge-upserts `patch` and returns the stored result.
    fn save_settings(&self, patch: &SettingsPatch) -> RepoResult<AppSettings>;
    /// Replaces the singleton with `settings` verbatim.
    fn put_settings(&self, settings: &AppSettings) -> RepoResult<()>;
    fn clear_settings(&self) -> RepoResult<usize>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after verifying the `settings` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "settings",
            &["id", "theme", "default_center", "language"],
        )?;
        Ok(Self::new(conn))
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_settings(&self) -> RepoResult<Option<AppSettings>> {
        load_settings(self.conn)
    }

    fn save_settings(&self, patch: &SettingsPatch) -> RepoResult<AppSettings> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut settings = load_settings(&tx)?.unwrap_or_default();
        patch.apply_to(&mut settings);
        write_settings(&tx, &settings)?;
        tx.commit()?;
        Ok(settings)
    }

    fn put_settings(&self, settings: &AppSettings) -> RepoResult<()> {
        write_settings(self.conn, settings)
    }

    fn clear_settings(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM settings;", [])?)
    }
}

fn load_settings(conn: &Connection) -> RepoResult<Option<AppSettings>> {
    let row = conn
        .query_row(
            "SELECT theme, default_center, language
             FROM settings
             WHERE id = ?1;",
            [SETTINGS_ROW_ID],
            |row| Ok(parse_settings_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn write_settings(conn: &Connection, settings: &AppSettings) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO settings (id, theme, default_center, language)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            theme = excluded.theme,
            default_center = excluded.default_center,
            language = excluded.language;",
        params![
            SETTINGS_ROW_ID,
            settings.theme.as_str(),
            settings.default_center,
            settings.language.as_str(),
        ],
    )?;
    Ok(())
}

fn parse_settings_row(row: &Row<'_>) -> RepoResult<AppSettings> {
    let theme_text: String = row.get("theme")?;
    let theme = Theme::parse(&theme_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid theme `{theme_text}` in settings.theme"))
    })?;

    Ok(AppSettings {
        theme,
        default_center: row.get("default_center")?,
        language: row.get("language")?,
    })
}
