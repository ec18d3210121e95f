//! Authentication service implementations

pub mod oauth;
pub mod session;
