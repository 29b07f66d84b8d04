//! SQLite-backed conversation store

use super::{ConversationStore, StoreResult, Turn, MAX_RETAINED_TURNS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS turns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id, id);
";

/// Durable store; sessions survive restarts
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert `turns` and evict past the retention bound in one transaction
    fn insert_turns(&self, session_id: &str, turns: &[&Turn]) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        Self::ensure_session(&tx, session_id)?;

        for turn in turns {
            tx.execute(
                "INSERT INTO turns (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session_id,
                    turn.role.as_str(),
                    turn.content,
                    turn.created_at.to_rfc3339()
                ],
            )?;
        }

        let limit = i64::try_from(MAX_RETAINED_TURNS).unwrap_or(i64::MAX);
        let evicted = tx.execute(
            "DELETE FROM turns
             WHERE session_id = ?1
               AND id NOT IN (
                   SELECT id FROM turns WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2
               )",
            params![session_id, limit],
        )?;
        tx.commit()?;

        if evicted > 0 {
            tracing::debug!(session_id, evicted, "Evicted oldest turns");
        }
        Ok(())
    }

    fn ensure_session(conn: &Connection, session_id: &str) -> StoreResult<()> {
        conn.execute(
            "INSERT OR IGNORE INTO sessions (id, created_at) VALUES (?1, ?2)",
            params![session_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn get_or_create(&self, session_id: &str) -> StoreResult<Vec<Turn>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Self::ensure_session(&conn, session_id)?;

        let mut stmt = conn.prepare(
            "SELECT role, content, created_at FROM turns
             WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut turns = Vec::new();
        for row in rows {
            let (role, content, created_at) = row?;
            turns.push(Turn {
                role: role.parse()?,
                content,
                created_at: parse_datetime(&created_at),
            });
        }
        Ok(turns)
    }

    async fn append(&self, session_id: &str, turn: Turn) -> StoreResult<()> {
        self.insert_turns(session_id, &[&turn])
    }

    async fn append_exchange(
        &self,
        session_id: &str,
        user: Turn,
        assistant: Turn,
    ) -> StoreResult<()> {
        self.insert_turns(session_id, &[&user, &assistant])
    }
}

fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
