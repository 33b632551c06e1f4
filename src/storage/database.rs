//! Analysis History Database
//!
//! SQLite store for completed analyses featuring:
//! - Connection pooling via r2d2 for concurrent access
//! - WAL mode with a busy timeout
//! - Schema version tracked in `user_version`

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use tracing::debug;

use crate::types::{AnalysisRequest, AnalysisResponse, Result, ResultExt, ToneError};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version
const SCHEMA_VERSION: u32 = 1;

const SUMMARY_COLUMNS: &str =
    "id, original_text, context, detected_tone, tone_category, confidence, created_at";

/// One stored analysis, without its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub original_text: String,
    pub context: Option<String>,
    pub detected_tone: Option<String>,
    pub tone_category: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Stored analysis with its decoded payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub summary: ConversationSummary,
    pub analysis: AnalysisResponse,
}

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
    /// Open database with connection pooling at the specified path.
    /// Parent directories are created as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| ToneError::Storage(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();

        // Every in-memory connection is a separate database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| ToneError::Storage(format!("Failed to create in-memory pool: {}", e)))?;

        Ok(Self { pool })
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            ToneError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Initialize database schema.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .with_context("Failed to read schema version")?;

        if current_version > SCHEMA_VERSION {
            return Err(ToneError::Storage(format!(
                "Database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            )));
        }

        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to set schema version")?;
        }

        Ok(())
    }

    // =========================================================================
    // Conversations
    // =========================================================================

    /// Persist an analysis and return its id.
    pub fn save_analysis(
        &self,
        request: &AnalysisRequest,
        response: &AnalysisResponse,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let analysis_json =
            serde_json::to_string(response).with_context("Failed to serialize analysis")?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.conn()?
            .execute(
                "INSERT INTO conversations
                 (id, original_text, context, detected_tone, tone_category, confidence,
                  analysis_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    id,
                    request.text.trim(),
                    request.context,
                    response.result.detected_tone,
                    response.result.tone_category,
                    response.result.confidence,
                    analysis_json,
                    now,
                ],
            )
            .with_context("Failed to store analysis")?;

        debug!(id = %id, tone = %response.result.detected_tone, "Stored analysis");
        Ok(id)
    }

    /// All stored analyses, newest first.
    pub fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM conversations ORDER BY created_at DESC, rowid DESC",
                SUMMARY_COLUMNS
            ))
            .with_context("Failed to prepare conversation query")?;

        let rows = stmt
            .query_map([], Self::summary_from_row)
            .with_context("Failed to query conversations")?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to read conversation row")
    }

    /// One stored analysis with its decoded payload.
    pub fn get_conversation(&self, id: &str) -> Result<Option<ConversationDetail>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!(
                    "SELECT {}, analysis_json FROM conversations WHERE id = ?1",
                    SUMMARY_COLUMNS
                ),
                params![id],
                |row| Ok((Self::summary_from_row(row)?, row.get::<_, String>(7)?)),
            )
            .optional()
            .with_context("Failed to query conversation")?;

        let Some((summary, analysis_json)) = row else {
            return Ok(None);
        };

        let analysis: AnalysisResponse = serde_json::from_str(&analysis_json)
            .with_context_fn(|| format!("Corrupt analysis payload for conversation {}", id))?;

        Ok(Some(ConversationDetail { summary, analysis }))
    }

    /// Number of stored analyses.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
            .with_context("Failed to count conversations")?;
        Ok(count as usize)
    }

    fn summary_from_row(row: &Row<'_>) -> std::result::Result<ConversationSummary, rusqlite::Error> {
        let created_at: String = row.get(6)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(ConversationSummary {
            id: row.get(0)?,
            original_text: row.get(1)?,
            context: row.get(2)?,
            detected_tone: row.get(3)?,
            tone_category: row.get(4)?,
            confidence: row.get(5)?,
            created_at,
        })
    }
}
