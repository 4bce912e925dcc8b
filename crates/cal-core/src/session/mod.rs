//! Session management
//!
//! A session is a logically continuous conversation identified by an opaque
//! id, carrying turn history across requests. Sessions persist to SQLite and
//! are cached in memory for the process lifetime.

pub mod manager;
pub mod store;
pub mod types;

pub use manager::SessionManager;
pub use store::SessionStore;
pub use types::Session;
