use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::payload::ExercisePayload;
use crate::scoring::ScoreReport;

/// One completed exercise as kept in local history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Local>,
    pub exercise_number: usize,
    pub language_pair: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub total_errors: usize,
    pub frustration_score: u8,
    pub final_score: u32,
    pub cheat_flagged: bool,
    #[serde(skip)]
    pub payload_json: String,
}

/// Local store of completed exercises
#[derive(Debug)]
pub struct ResultsDb {
    conn: Connection,
}

impl ResultsDb {
    /// Open the store under the state directory, creating it if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("typeswitch_results.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS exercise_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recorded_at TEXT NOT NULL,
                exercise_number INTEGER NOT NULL,
                language_pair TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                total_errors INTEGER NOT NULL,
                frustration_score INTEGER NOT NULL,
                final_score INTEGER NOT NULL,
                cheat_flagged BOOLEAN NOT NULL,
                payload TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_exercise_results_recorded_at ON exercise_results(recorded_at)",
            [],
        )?;

        Ok(ResultsDb { conn })
    }

    /// Record an accepted exercise and the score it earned
    pub fn record(&self, payload: &ExercisePayload, score: &ScoreReport) -> Result<()> {
        self.record_at(payload, score, Local::now())
    }

    pub fn record_at(
        &self,
        payload: &ExercisePayload,
        score: &ScoreReport,
        recorded_at: DateTime<Local>,
    ) -> Result<()> {
        let payload_json = payload
            .to_json()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let m = &payload.metrics;

        self.conn.execute(
            r#"
            INSERT INTO exercise_results
            (recorded_at, exercise_number, language_pair, wpm, accuracy, total_errors,
             frustration_score, final_score, cheat_flagged, payload)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                recorded_at.to_rfc3339(),
                payload.exercise_number as i64,
                payload.language_pair,
                m.wpm(),
                m.accuracy(),
                m.total_errors() as i64,
                m.frustration_score(),
                score.final_score,
                payload.cheat_flagged,
                payload_json,
            ],
        )?;
        log::info!(
            "recorded exercise {} ({}) with score {}",
            payload.exercise_number,
            payload.language_pair,
            score.final_score
        );

        Ok(())
    }

    /// Most recent results first
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT recorded_at, exercise_number, language_pair, wpm, accuracy, total_errors,
                   frustration_score, final_score, cheat_flagged, payload
            FROM exercise_results
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], |row| {
            let recorded_at: String = row.get(0)?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        0,
                        "recorded_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryEntry {
                recorded_at,
                exercise_number: row.get::<_, i64>(1)? as usize,
                language_pair: row.get(2)?,
                wpm: row.get(3)?,
                accuracy: row.get(4)?,
                total_errors: row.get::<_, i64>(5)? as usize,
                frustration_score: row.get(6)?,
                final_score: row.get(7)?,
                cheat_flagged: row.get(8)?,
                payload_json: row.get(9)?,
            })
        })?;

        rows.collect()
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercise_results", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM exercise_results", [])?;
        Ok(())
    }
}

/// Write entries as CSV with a header row.
pub fn export_csv<W: io::Write>(entries: &[HistoryEntry], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}
