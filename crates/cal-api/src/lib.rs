//! cal-api: HTTP API for cal-gateway
//!
//! Provides the `/chat` and `/health` REST endpoints for the calendar
//! assistant. Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{app, start_server, AppState};
