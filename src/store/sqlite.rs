use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{JobStore, StoreError};
use crate::models::{Job, JobStatus, NewJob, User};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS schema_version (
         version    INTEGER PRIMARY KEY,
         applied_at TEXT NOT NULL
     );
     CREATE TABLE users (
         user_id    TEXT PRIMARY KEY,
         name       TEXT NOT NULL,
         email      TEXT NOT NULL,
         created_at TEXT NOT NULL
     );
     CREATE TABLE analysis (
         job_id       TEXT PRIMARY KEY,
         user_id      TEXT NOT NULL,
         file_name    TEXT NOT NULL,
         query        TEXT NOT NULL,
         status       TEXT NOT NULL CHECK (status IN ('processing', 'completed', 'failed')),
         analysis     TEXT,
         error        TEXT,
         created_at   TEXT NOT NULL,
         completed_at TEXT
     );
     CREATE INDEX idx_analysis_user ON analysis(user_id);
     INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'));",
)];

/// SQLite-backed [`JobStore`].
///
/// One connection behind a mutex; every call runs on the blocking pool so
/// async handlers never wait on disk I/O.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the store named by a connection string: `sqlite://<path>`,
    /// `sqlite:<path>`, a bare path, or `:memory:`.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let target = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url)
            .trim();
        if target.is_empty() {
            return Err(StoreError::InvalidUrl(database_url.to_string()));
        }
        if target == ":memory:" {
            return Self::open_in_memory();
        }
        Self::open(Path::new(target))
    }

    /// Open (creating if needed) a database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", path.display())))?;
        }
        let conn = Connection::open(path)?;
        info!("Opened job store at {}", path.display());
        Self::init(conn)
    }

    /// Open an in-memory database (tests, throwaway runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);
    for (version, sql) in MIGRATIONS {
        if *version > current_version {
            info!("Running job store migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
        }
    }
    Ok(())
}

/// Current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Move a `processing` job to a terminal state, or explain why not.
fn finish_job(
    conn: &Connection,
    job_id: &str,
    status: JobStatus,
    analysis: Option<&str>,
    error: Option<&str>,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE analysis
            SET status = ?2, analysis = ?3, error = ?4, completed_at = ?5
          WHERE job_id = ?1 AND status = 'processing'",
        params![job_id, status.as_str(), analysis, error, Utc::now()],
    )?;
    if changed == 1 {
        debug!("Job {job_id} marked {status}");
        return Ok(());
    }

    let current: Option<String> = conn
        .query_row(
            "SELECT status FROM analysis WHERE job_id = ?1",
            params![job_id],
            |row| row.get(0),
        )
        .optional()?;
    match current {
        Some(status) => Err(StoreError::NotProcessing {
            job_id: job_id.to_string(),
            status,
        }),
        None => Err(StoreError::UnknownJob {
            job_id: job_id.to_string(),
        }),
    }
}

struct JobRow {
    job_id: String,
    user_id: String,
    file_name: String,
    query: String,
    status: String,
    analysis: Option<String>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::parse(&row.status).ok_or_else(|| {
            StoreError::CorruptRecord(format!("job {} has status '{}'", row.job_id, row.status))
        })?;
        Ok(Job {
            job_id: row.job_id,
            user_id: row.user_id,
            file_name: row.file_name,
            query: row.query,
            status,
            analysis: row.analysis,
            error: row.error,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn create_user(&self, name: &str, email: &str) -> Result<User, StoreError> {
        let user = User {
            user_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        let record = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![record.user_id, record.name, record.email, record.created_at],
            )?;
            Ok(())
        })
        .await?;
        Ok(user)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let created = Job {
            job_id: job.job_id,
            user_id: job.user_id,
            file_name: job.file_name,
            query: job.query,
            status: JobStatus::Processing,
            analysis: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let record = created.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO analysis (job_id, user_id, file_name, query, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.job_id,
                    record.user_id,
                    record.file_name,
                    record.query,
                    record.status.as_str(),
                    record.created_at
                ],
            )?;
            Ok(())
        })
        .await?;
        Ok(created)
    }

    async fn complete_job(&self, job_id: &str, analysis: &str) -> Result<(), StoreError> {
        let job_id = job_id.to_string();
        let analysis = analysis.to_string();
        self.with_conn(move |conn| {
            finish_job(conn, &job_id, JobStatus::Completed, Some(&analysis), None)
        })
        .await
    }

    async fn fail_job(&self, job_id: &str, error: &str) -> Result<(), StoreError> {
        let job_id = job_id.to_string();
        let error = error.to_string();
        self.with_conn(move |conn| finish_job(conn, &job_id, JobStatus::Failed, None, Some(&error)))
            .await
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let job_id = job_id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT job_id, user_id, file_name, query, status, analysis, error,
                            created_at, completed_at
                       FROM analysis WHERE job_id = ?1",
                    params![job_id],
                    |row| {
                        Ok(JobRow {
                            job_id: row.get(0)?,
                            user_id: row.get(1)?,
                            file_name: row.get(2)?,
                            query: row.get(3)?,
                            status: row.get(4)?,
                            analysis: row.get(5)?,
                            error: row.get(6)?,
                            created_at: row.get(7)?,
                            completed_at: row.get(8)?,
                        })
                    },
                )
                .optional()?;
            row.map(Job::try_from).transpose()
        })
        .await
    }
}
