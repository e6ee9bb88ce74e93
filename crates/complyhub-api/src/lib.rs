//! # complyhub-api
//!
//! HTTP API layer for ComplyHub built on Axum.
//!
//! Provides all REST endpoints under `/api/v1`, middleware (request
//! logging, CORS, compression, body limits), extractors, the response
//! envelope and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_state, run_server};
pub use router::build_router;
pub use state::AppState;
