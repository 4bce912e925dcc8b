//! Session lifecycle management

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::llm::Message;
use crate::session::{Session, SessionStore};
use crate::{Error, Result};

/// Session manager that handles session lifecycle
///
/// Sessions are cached in memory and written through to the SQLite store on
/// every mutation. `lock()` hands out a per-session mutex; the chat handler
/// holds it for the whole request so concurrent requests on the same session
/// id are serialized.
pub struct SessionManager {
    /// Persistent storage (wrapped in Mutex for thread safety)
    store: Arc<Mutex<SessionStore>>,
    /// In-memory cache for active sessions
    cache: Arc<RwLock<HashMap<String, Session>>>,
    /// Per-session request locks
    locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl SessionManager {
    /// Create a new session manager with a database path
    pub fn new(db_path: &str) -> Result<Self> {
        let store = SessionStore::new(db_path)?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            cache: Arc::new(RwLock::new(HashMap::new())),
            locks: DashMap::new(),
        })
    }

    /// Create an in-memory session manager (for testing)
    pub fn in_memory() -> Result<Self> {
        let store = SessionStore::in_memory()?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            cache: Arc::new(RwLock::new(HashMap::new())),
            locks: DashMap::new(),
        })
    }

    /// Get the mutex serializing requests for a session id
    pub fn lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Get or create a session for an id
    pub async fn get_or_create(&self, id: &str) -> Result<Session> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(session) = cache.get(id) {
                debug!("Session found in cache: {}", id);
                return Ok(session.clone());
            }
        }

        // Try to load from store (drop the store guard before awaiting the
        // cache lock so the future stays Send)
        let loaded = {
            let store = self.store.lock().unwrap();
            store.load(id)?
        };
        if let Some(session) = loaded {
            debug!("Session loaded from store: {}", id);
            let mut cache = self.cache.write().await;
            cache.insert(id.to_string(), session.clone());
            return Ok(session);
        }

        // Create new session
        info!("Creating new session: {}", id);
        let session = Session::new(id);
        {
            let store = self.store.lock().unwrap();
            store.save(&session)?;
        }

        let mut cache = self.cache.write().await;
        cache.insert(id.to_string(), session.clone());

        Ok(session)
    }

    /// Add a message to a session
    pub async fn add_message(&self, id: &str, message: Message) -> Result<()> {
        let mut cache = self.cache.write().await;

        let session = cache
            .get_mut(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;

        session.add_message(message);

        let store = self.store.lock().unwrap();
        store.save(session)?;

        Ok(())
    }

    /// Replace the full message history of a session
    ///
    /// Used after an agent-loop run to persist the transcript, including the
    /// tool-use and tool-result turns appended during the loop.
    pub async fn replace_messages(&self, id: &str, messages: Vec<Message>) -> Result<()> {
        let mut cache = self.cache.write().await;

        let session = cache
            .get_mut(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;

        session.messages = messages;
        session.updated_at = chrono::Utc::now();

        let store = self.store.lock().unwrap();
        store.save(session)?;

        Ok(())
    }

    /// Get all messages for a session
    pub async fn get_messages(&self, id: &str) -> Result<Vec<Message>> {
        let cache = self.cache.read().await;

        let session = cache
            .get(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;

        Ok(session.messages.clone())
    }

    /// Clear messages for a session
    pub async fn clear_messages(&self, id: &str) -> Result<()> {
        let mut cache = self.cache.write().await;

        if let Some(session) = cache.get_mut(id) {
            session.clear_messages();
            let store = self.store.lock().unwrap();
            store.save(session)?;
            info!("Cleared messages for session: {}", id);
        }

        Ok(())
    }

    /// Delete a session completely
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        {
            let mut cache = self.cache.write().await;
            cache.remove(id);
        }

        {
            let store = self.store.lock().unwrap();
            store.delete(id)?;
        }
        self.locks.remove(id);
        info!("Deleted session: {}", id);

        Ok(())
    }

    /// Get the number of cached sessions
    pub async fn session_count(&self) -> usize {
        let cache = self.cache.read().await;
        cache.len()
    }
}
