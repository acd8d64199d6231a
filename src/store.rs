use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{PoolError, PoolResult};
use crate::reference::Competitor;
use crate::schema::{self, SchemaDoc};

/// One persisted prediction, in the stable column order used everywhere:
/// `(user_id, home, away, home_score, visitor_score)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    pub user_id: String,
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub visitor_score: u32,
}

/// SQLite-backed prediction store.
///
/// Owns the long-lived connection for the session and is passed explicitly
/// to every call site; there is no global handle. All reads and writes are
/// parameterized.
pub struct PredictionStore {
    conn: Connection,
}

impl PredictionStore {
    pub fn open(path: &Path) -> PoolResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    PoolError::Configuration(format!(
                        "create database directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> PoolResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Apply the declarative schema document. Safe on every startup.
    pub fn apply_schema(&self, doc: &SchemaDoc) -> PoolResult<()> {
        schema::apply_schema(&self.conn, doc)
    }

    /// Seed the immutable group roster. `INSERT OR IGNORE` keyed on the
    /// table's primary key makes repeated seeding a no-op; returns the number
    /// of newly inserted rows.
    pub fn seed_competitors(&mut self, roster: &[Competitor]) -> PoolResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO tbl_groups (group_name, country) VALUES (?1, ?2)",
            )?;
            for competitor in roster {
                inserted += stmt.execute(params![competitor.group_name, competitor.country])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn group_names(&self) -> PoolResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT group_name FROM tbl_groups ORDER BY group_name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Competitors of one group in seeding order, which fixes the home side
    /// of every generated matchup. The group name is always bound, never
    /// interpolated.
    pub fn group_roster(&self, group_name: &str) -> PoolResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT country FROM tbl_groups WHERE group_name = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![group_name], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Upsert one prediction.
    ///
    /// Rejects an empty `user_id` before any storage call. The write is one
    /// atomic statement: the conflict target is the `(user_id, home, away)`
    /// primary key, so after the call exactly one row exists for that key and
    /// the latest scores win.
    pub fn submit_prediction(
        &self,
        user_id: &str,
        home: &str,
        away: &str,
        home_score: u32,
        visitor_score: u32,
    ) -> PoolResult<()> {
        if user_id.trim().is_empty() {
            return Err(PoolError::Validation("user_id must not be empty".to_string()));
        }
        if home.trim().is_empty() || away.trim().is_empty() {
            return Err(PoolError::Validation(
                "matchup sides must not be empty".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO tbl_predictions (user_id, home, away, home_score, visitor_score)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, home, away) DO UPDATE SET
                 home_score = excluded.home_score,
                 visitor_score = excluded.visitor_score",
            params![user_id, home, away, home_score as i64, visitor_score as i64],
        )?;
        Ok(())
    }

    /// Read-only existence probe for `(user_id, home, away)`. The upsert does
    /// not depend on it; the UI uses it to phrase "recorded" vs "updated".
    pub fn has_existing_prediction(
        &self,
        user_id: &str,
        home: &str,
        away: &str,
    ) -> PoolResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM tbl_predictions WHERE user_id = ?1 AND home = ?2 AND away = ?3",
                params![user_id, home, away],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All predictions ordered by `(user_id, home, away)`.
    pub fn list_predictions(&self) -> PoolResult<Vec<PredictionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, home, away, home_score, visitor_score
             FROM tbl_predictions
             ORDER BY user_id, home, away",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PredictionRow {
                user_id: row.get(0)?,
                home: row.get(1)?,
                away: row.get(2)?,
                home_score: row.get::<_, i64>(3)? as u32,
                visitor_score: row.get::<_, i64>(4)? as u32,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn prediction_count(&self) -> PoolResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tbl_predictions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
