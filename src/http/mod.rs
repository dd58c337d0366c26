//! HTTP API for a browser view of the interview
//!
//! This module provides a REST API over the session controller:
//! - POST /session/start - Start an interview
//! - POST /session/leave - Leave the interview
//! - POST /session/error/dismiss - Clear the visible error
//! - GET /session/status - Lifecycle, status and error
//! - GET /session/transcript - De-duplicated transcript
//! - GET /session/feedback - Feedback retrieval state
//! - GET /health - Health check
//!
//! `serve` runs the router for an embedding application that supplies the
//! voice agent.

mod handlers;
mod routes;
mod server;
mod state;

pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
