//! Session persistence using SQLite

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::llm::Message;
use crate::session::Session;
use crate::{Error, Result};

/// SQLite-based session store keyed by session id
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Create a new session store with the given database path
    pub fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory session store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    /// Initialize database tables
    fn init_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                messages TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Save a session to the database
    pub fn save(&self, session: &Session) -> Result<()> {
        let messages_json = serde_json::to_string(&session.messages)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions (id, messages, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id,
                messages_json,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load a session by id
    pub fn load(&self, id: &str) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, messages, created_at, updated_at FROM sessions WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![id], Self::row_to_session);

        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
        let messages_json: String = row.get(1)?;
        let messages: Vec<Message> =
            serde_json::from_str(&messages_json).map_err(|_| rusqlite::Error::InvalidQuery)?;

        let created_at_str: String = row.get(2)?;
        let updated_at_str: String = row.get(3)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc);

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc);

        Ok(Session {
            id: row.get(0)?,
            messages,
            created_at,
            updated_at,
        })
    }

    /// Delete a session by id
    pub fn delete(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Count stored sessions
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
