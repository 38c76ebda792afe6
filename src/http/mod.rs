//! HTTP API for the practice page
//!
//! This module provides a REST API over a single `SessionController`:
//! - POST /practice/preview - Acquire the capture source
//! - POST /practice/frame - Upload the latest camera frame
//! - POST /practice/start - Start a session
//! - POST /practice/stop - Stop and return the report
//! - GET /practice/status - Query session status
//! - GET /practice/history - Samples collected so far
//! - GET /practice/events - Server-sent session events
//! - DELETE /practice - Release capture
//! - POST /similarity - Look-alike analysis of one photo
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
