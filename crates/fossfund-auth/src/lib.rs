//! fossfund auth - OAuth login and sessions
//!
//! This crate provides:
//! - OAuth2 provider configuration and the authorization code flow
//! - Server-side sessions referenced by a sealed session cookie
//! - The per-request authentication context

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
