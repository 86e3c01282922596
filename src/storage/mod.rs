// SQLite persistence and migrations

pub mod iterations;
pub mod projects;
pub mod prompts;
pub mod refinement_state;
pub mod reports;
pub mod stages;
pub mod transfer;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to encode stored value: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    NotFound(String),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        // Enable foreign key enforcement - must be done on each connection
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> rusqlite::Result<()> {
        self.create_metadata_table()?;
        let version = self.get_schema_version()?;

        // Forward compatibility check: refuse databases created by a newer build
        if version > SCHEMA_VERSION {
            return Err(rusqlite::Error::InvalidParameterName(format!(
                "Database schema version {} is newer than application version {}. Please upgrade the application.",
                version, SCHEMA_VERSION
            )));
        }

        if version < SCHEMA_VERSION {
            self.run_migrations(version)?;
        }

        Ok(())
    }

    fn create_metadata_table(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get_schema_version(&self) -> rusqlite::Result<i32> {
        let version: rusqlite::Result<String> = self.conn.query_row(
            "SELECT value FROM schema_metadata WHERE key = 'version'",
            [],
            |row| row.get(0),
        );

        match version {
            Ok(v) => Ok(v.parse().unwrap_or(0)),
            Err(_) => {
                self.conn.execute(
                    "INSERT INTO schema_metadata (key, value) VALUES ('version', '0')",
                    [],
                )?;
                Ok(0)
            }
        }
    }

    fn set_schema_version(&self, version: i32) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE schema_metadata SET value = ?1 WHERE key = 'version'",
            params![version.to_string()],
        )?;
        Ok(())
    }

    fn run_migrations(&self, from_version: i32) -> rusqlite::Result<()> {
        if from_version < 1 {
            self.migrate_to_v1()?;
        }
        // Future migrations will be added here
        Ok(())
    }

    fn migrate_to_v1(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        // Stage input/output blobs, one row per (project, stage)
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS stage_records (
                project_id TEXT NOT NULL,
                stage TEXT NOT NULL,
                input TEXT,
                output TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (project_id, stage),
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            )",
            [],
        )?;

        // Append-only validation report history
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS validation_reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id TEXT NOT NULL,
                report TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            )",
            [],
        )?;

        // Append-only refinement iteration history
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS improvement_iterations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id TEXT NOT NULL,
                iteration TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            )",
            [],
        )?;

        // Latest refined document + pillar scores, replaced wholesale
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS refinement_state (
                project_id TEXT PRIMARY KEY,
                overview TEXT NOT NULL,
                pillars TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS prompt_overrides (
                name TEXT PRIMARY KEY,
                system_prompt TEXT NOT NULL,
                user_prompt TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_stage_records_project_id ON stage_records(project_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_validation_reports_project_id ON validation_reports(project_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_improvement_iterations_project_id ON improvement_iterations(project_id)",
            [],
        )?;

        self.set_schema_version(1)?;
        Ok(())
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

/// Parse an rfc3339 TEXT column back into a timestamp
pub(crate) fn parse_timestamp(index: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
pub(crate) fn test_database() -> Database {
    let db = Database::new(":memory:").unwrap();
    db.init().unwrap();
    db
}
