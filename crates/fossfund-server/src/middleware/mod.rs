// HTTP middleware implementations
// This module contains the session middleware and forwarded-header handling

pub mod forwarded; // Trusted proxies and client address resolution
pub mod session; // Attaches the logged in user to every request
