//! Application state management
//!
//! This module defines the central application state shared across all handlers.

use std::sync::Arc;

use fossfund_auth::service::{oauth::OAuthService, session::SessionService};
use fossfund_persistence::PersistenceService;

use crate::middleware::forwarded::TrustedProxies;
use crate::service::logo::LogoStore;

use super::config::Configuration;

/// Application state shared across all handlers
pub struct AppState {
    pub configuration: Configuration,
    /// Persistence backend (SQL in production, in memory in tests)
    pub persistence: Arc<dyn PersistenceService>,
    /// OAuth2 login flow
    pub oauth_service: Arc<OAuthService>,
    /// Session cookie sealing and lookup
    pub session_service: Arc<SessionService>,
    /// Logo image files below the static directory
    pub logo_store: LogoStore,
    /// Proxies allowed to set forwarded headers
    pub trusted_proxies: TrustedProxies,
}

impl AppState {
    pub fn new(
        configuration: Configuration,
        persistence: Arc<dyn PersistenceService>,
        oauth_service: Arc<OAuthService>,
        session_service: Arc<SessionService>,
    ) -> Self {
        let logo_store = LogoStore::new(configuration.static_dir(), configuration.max_logo_size());
        let trusted_proxies = TrustedProxies::new(configuration.forwarded_allow_ips());

        Self {
            configuration,
            persistence,
            oauth_service,
            session_service,
            logo_store,
            trusted_proxies,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("persistence", &"<dyn PersistenceService>")
            .field("oauth_service", &"<OAuthService>")
            .field("session_service", &self.session_service)
            .field("logo_store", &self.logo_store)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}
