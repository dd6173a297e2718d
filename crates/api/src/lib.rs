//! Vitals API
//!
//! Axum routes and middleware for the Vitals Hub REST, tool-call and live
//! event surfaces.

pub mod auth;
pub mod handlers;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod router;
pub mod security;
pub mod state;

pub use router::create_router;
pub use state::AppState;
