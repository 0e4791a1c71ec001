//! # Kenning
//!
//! The application layer around `kenning-core`: a clap CLI and an axum HTTP
//! API. Exposed as a library so integration tests can build the router
//! without starting a server.

pub mod api;
pub mod cli;
