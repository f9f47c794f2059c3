//! Database Layer with Connection Pooling and Safe Transactions
//!
//! SQLite project store featuring:
//! - Connection pooling via r2d2
//! - Panic-safe transactions with automatic rollback
//! - Version-tracked migrations
//! - WAL mode for file-backed databases

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;

use super::store::{IterationRecord, ProjectRecord, ProjectStore};
use crate::types::{
    FileSet, ForgeError, ImplementationPlan, RefinedSpecification, Result, ResultExt,
    ReviewVerdict,
};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 1;

/// Migration definitions
struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

// Versions above SCHEMA_VERSION are applied to existing databases on open.
const MIGRATIONS: &[Migration] = &[];

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 4,
            connection_timeout_secs: 30,
        }
    }
}

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open database with connection pooling at the specified path,
    /// creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| ForgeError::Storage(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // One connection: every pooled connection would otherwise get its own database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| ForgeError::Storage(format!("Failed to create in-memory pool: {}", e)))?;

        Ok(Self { pool })
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            ForgeError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Initialize database schema.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;

        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);
        if current_version == 0 {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to set schema version")?;
        }

        drop(conn);
        self.migrate()
    }

    /// Run version-tracked migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;

        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        let mut latest = current_version;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
            conn.execute_batch(migration.up).with_context_fn(|| {
                format!(
                    "Failed to apply migration {}: {}",
                    migration.version, migration.description
                )
            })?;
            tracing::info!(
                "Applied migration {}: {}",
                migration.version,
                migration.description
            );
            latest = migration.version;
        }

        if latest > current_version {
            conn.pragma_update(None, "user_version", latest)
                .with_context("Failed to update schema version")?;
        }

        Ok(())
    }

    /// Get a raw connection for advanced operations.
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.conn()
    }

    /// Execute a function within a panic-safe database transaction.
    ///
    /// If the closure fails or panics the transaction is rolled back and an
    /// error is returned instead of poisoning the connection pool.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .with_context("Failed to start transaction")?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit().with_context("Failed to commit transaction")?;
                Ok(value)
            }
            // Rolled back on drop
            Ok(Err(e)) => Err(e),
            Err(panic_payload) => {
                let panic_msg = panic_payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());

                tracing::error!("Transaction panicked: {}", panic_msg);
                Err(ForgeError::Storage(format!(
                    "Transaction panicked: {}",
                    panic_msg
                )))
            }
        }
    }

    /// Update one JSON column of the project's latest iteration
    fn update_latest_iteration<T: Serialize>(
        &self,
        project_id: i64,
        column: &str,
        value: &T,
    ) -> Result<bool> {
        let json = serde_json::to_string(value)?;
        let conn = self.conn()?;
        set_latest_iteration(&conn, project_id, column, &json)
    }

    fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRecord> {
        Ok(ProjectRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            goal: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

const PROJECT_COLUMNS: &str = "id, name, goal, status, created_at, updated_at";

fn set_latest_iteration(conn: &Connection, project_id: i64, column: &str, json: &str) -> Result<bool> {
    let updated = conn
        .execute(
            &format!(
                "UPDATE project_iterations SET {} = ?1
                 WHERE project_id = ?2 AND iteration_number =
                    (SELECT MAX(iteration_number) FROM project_iterations WHERE project_id = ?2)",
                column
            ),
            params![json, project_id],
        )
        .with_context_fn(|| format!("Failed to record {} for project {}", column, project_id))?;

    if updated == 0 {
        tracing::warn!("Project {} has no iteration to attach {} to", project_id, column);
    }
    Ok(updated > 0)
}

/// Delete-then-insert the project's files and mark it `generated`
fn write_files(conn: &Connection, project_id: i64, files: &FileSet, now: &str) -> Result<()> {
    conn.execute("DELETE FROM generated_files WHERE project_id = ?1", [project_id])?;

    let mut insert = conn.prepare(
        "INSERT INTO generated_files (project_id, filename, content, file_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (name, content) in files.iter() {
        insert.execute(params![project_id, name, content, FileSet::file_type(name), now])?;
    }

    let updated = conn.execute(
        "UPDATE projects SET status = 'generated', updated_at = ?1 WHERE id = ?2",
        params![now, project_id],
    )?;
    if updated == 0 {
        return Err(ForgeError::NotFound(format!("Project {}", project_id)));
    }
    Ok(())
}

fn parse_json_column(text: Option<String>) -> Option<Value> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}

impl ProjectStore for Database {
    fn create_project(&self, name: &str, goal: Option<&str>) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO projects (name, goal, status, created_at, updated_at)
             VALUES (?1, ?2, 'draft', ?3, ?3)",
            params![name, goal, now],
        )
        .with_context_fn(|| format!("Failed to create project '{}'", name))?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Created project {} ({})", id, name);
        Ok(id)
    }

    fn get_project(&self, project_id: i64) -> Result<Option<ProjectRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
            [project_id],
            Self::map_project_row,
        )
        .optional()
        .with_context("Failed to load project")
    }

    fn find_project(&self, name: &str) -> Result<Option<ProjectRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM projects WHERE name = ?1", PROJECT_COLUMNS),
            [name],
            Self::map_project_row,
        )
        .optional()
        .with_context("Failed to find project")
    }

    fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM projects ORDER BY updated_at DESC, id DESC",
            PROJECT_COLUMNS
        ))?;
        let projects = stmt
            .query_map([], Self::map_project_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    fn record_refinement(&self, project_id: i64, spec: &RefinedSpecification) -> Result<u32> {
        let json = serde_json::to_string(spec)?;
        let now = chrono::Utc::now().to_rfc3339();

        self.transaction(|conn| {
            let max: Option<u32> = conn.query_row(
                "SELECT MAX(iteration_number) FROM project_iterations WHERE project_id = ?1",
                [project_id],
                |row| row.get(0),
            )?;
            let next = max.unwrap_or(0) + 1;

            conn.execute(
                "INSERT INTO project_iterations (project_id, iteration_number, refined_prompt, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![project_id, next, json, now],
            )
            .with_context_fn(|| format!("Failed to start iteration for project {}", project_id))?;

            Ok(next)
        })
    }

    fn record_plan(&self, project_id: i64, plan: &ImplementationPlan) -> Result<bool> {
        self.update_latest_iteration(project_id, "plan", plan)
    }

    fn record_review(&self, project_id: i64, verdict: &ReviewVerdict) -> Result<bool> {
        self.update_latest_iteration(project_id, "review_notes", verdict)
    }

    fn replace_files(&self, project_id: i64, files: &FileSet) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.transaction(|conn| write_files(conn, project_id, files, &now))?;

        tracing::debug!("Stored {} files for project {}", files.len(), project_id);
        Ok(())
    }

    fn record_generation(
        &self,
        project_id: i64,
        files: &FileSet,
        verdict: &ReviewVerdict,
    ) -> Result<bool> {
        let review = serde_json::to_string(verdict)?;
        let now = chrono::Utc::now().to_rfc3339();

        let attached = self.transaction(|conn| {
            write_files(conn, project_id, files, &now)?;
            set_latest_iteration(conn, project_id, "review_notes", &review)
        })?;

        tracing::debug!(
            "Stored {} files and review for project {}",
            files.len(),
            project_id
        );
        Ok(attached)
    }

    fn load_files(&self, project_id: i64) -> Result<FileSet> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT filename, content FROM generated_files WHERE project_id = ?1 ORDER BY filename",
        )?;
        let files = stmt
            .query_map([project_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<FileSet>>()?;
        Ok(files)
    }

    fn latest_iteration(&self, project_id: i64) -> Result<Option<IterationRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT project_id, iteration_number, refined_prompt, plan, review_notes, created_at
             FROM project_iterations WHERE project_id = ?1
             ORDER BY iteration_number DESC LIMIT 1",
            [project_id],
            |row| {
                Ok(IterationRecord {
                    project_id: row.get(0)?,
                    iteration_number: row.get(1)?,
                    refined_prompt: parse_json_column(row.get(2)?),
                    plan: parse_json_column(row.get(3)?),
                    review_notes: parse_json_column(row.get(4)?),
                    created_at: row.get(5)?,
                })
            },
        )
        .optional()
        .with_context("Failed to load latest iteration")
    }

    fn ping(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
