//! HTTP front end for the Portal shortener.
//!
//! Wires the shortener, the redirector and the background sweeper around a
//! shared store and exposes them over axum.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use config::Cli;
pub use state::AppState;
