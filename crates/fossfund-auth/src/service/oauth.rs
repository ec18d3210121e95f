//! OAuth2 Authentication Service
//!
//! Implements the authorization code flow used to log users in.
//!
//! Supported providers:
//! - GitHub
//! - Bitbucket
//! - Google
//!
//! # Configuration
//!
//! Providers are configured in application.yml. Endpoints and the user id
//! claim default per provider and only need to be set to override them:
//! ```yaml
//! oauth:
//!   providers:
//!     github:
//!       client_id: <GitHub OAuth app client id>
//!       client_secret: <GitHub OAuth app client secret>
//! ```

use std::collections::HashMap;
use std::time::Duration;

use moka::future::Cache;
use rand::Rng;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use fossfund_common::FossfundError;
use fossfund_persistence::model::OAuthProvider;

/// Lifetime of an authorization state
const STATE_TTL: Duration = Duration::from_secs(600);

/// Length of generated state values
const STATE_LEN: usize = 32;

/// OAuth2 provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Authorization endpoint
    #[serde(default)]
    pub authorize_endpoint: Option<String>,
    /// Token endpoint
    #[serde(default)]
    pub token_endpoint: Option<String>,
    /// User info endpoint
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    /// OAuth2 scopes
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    /// Claim of the user info response holding the provider user id
    #[serde(default)]
    pub user_id_claim: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Built-in endpoints of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorize: &'static str,
    pub token: &'static str,
    pub userinfo: &'static str,
    pub scopes: &'static [&'static str],
    pub user_id_claim: &'static str,
}

impl ProviderEndpoints {
    pub fn of(provider: OAuthProvider) -> Self {
        match provider {
            OAuthProvider::Github => Self {
                authorize: "https://github.com/login/oauth/authorize",
                token: "https://github.com/login/oauth/access_token",
                userinfo: "https://api.github.com/user",
                scopes: &[],
                user_id_claim: "id",
            },
            OAuthProvider::Bitbucket => Self {
                authorize: "https://bitbucket.org/site/oauth2/authorize",
                token: "https://bitbucket.org/site/oauth2/access_token",
                userinfo: "https://api.bitbucket.org/2.0/user",
                scopes: &[],
                user_id_claim: "uuid",
            },
            OAuthProvider::Google => Self {
                authorize: "https://accounts.google.com/o/oauth2/v2/auth",
                token: "https://oauth2.googleapis.com/token",
                userinfo: "https://openidconnect.googleapis.com/v1/userinfo",
                scopes: &["openid", "profile"],
                user_id_claim: "sub",
            },
        }
    }
}

/// A configured provider with every endpoint resolved
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: OAuthProvider,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub scopes: Vec<String>,
    pub user_id_claim: String,
}

impl ResolvedProvider {
    fn resolve(provider: OAuthProvider, config: &OAuthProviderConfig) -> Self {
        let defaults = ProviderEndpoints::of(provider);

        Self {
            provider,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            authorize_endpoint: config
                .authorize_endpoint
                .clone()
                .unwrap_or_else(|| defaults.authorize.to_string()),
            token_endpoint: config
                .token_endpoint
                .clone()
                .unwrap_or_else(|| defaults.token.to_string()),
            userinfo_endpoint: config
                .userinfo_endpoint
                .clone()
                .unwrap_or_else(|| defaults.userinfo.to_string()),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| defaults.scopes.iter().map(|s| s.to_string()).collect()),
            user_id_claim: config
                .user_id_claim
                .clone()
                .unwrap_or_else(|| defaults.user_id_claim.to_string()),
        }
    }
}

/// Global OAuth2 configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Configured OAuth providers keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, OAuthProviderConfig>,
}

/// OAuth2 token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth2 user info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    pub provider: OAuthProvider,
    /// Provider user ID, taken from the configured claim
    pub provider_user_id: String,
    /// Raw claims
    #[serde(default)]
    pub raw_claims: HashMap<String, serde_json::Value>,
}

/// OAuth2 authorization state (for CSRF protection)
#[derive(Debug, Clone)]
pub struct OAuthState {
    pub provider: OAuthProvider,
    pub redirect_uri: String,
}

/// OAuth2 service for handling authentication
pub struct OAuthService {
    providers: HashMap<OAuthProvider, ResolvedProvider>,
    http_client: reqwest::Client,
    /// Cache for authorization states (CSRF protection)
    state_cache: Cache<String, OAuthState>,
}

impl OAuthService {
    /// Create a new OAuth2 service
    ///
    /// Fails when a provider name is not a known provider.
    pub fn new(config: &OAuthConfig) -> anyhow::Result<Self> {
        let mut providers = HashMap::new();
        for (name, provider_config) in config.providers.iter().filter(|(_, p)| p.enabled) {
            let provider: OAuthProvider = name.parse().map_err(|_| {
                FossfundError::ConfigError(format!("unknown OAuth provider '{}'", name))
            })?;
            providers.insert(
                provider,
                ResolvedProvider::resolve(provider, provider_config),
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("fossfund/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(providers = providers.len(), "OAuth service initialized");

        Ok(Self {
            providers,
            http_client,
            state_cache: Cache::builder()
                .time_to_live(STATE_TTL)
                .max_capacity(10000)
                .build(),
        })
    }

    /// Get all enabled provider names, sorted
    pub fn get_enabled_providers(&self) -> Vec<OAuthProvider> {
        let mut providers: Vec<OAuthProvider> = self.providers.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    /// Look up an enabled provider by its name
    pub fn provider(&self, name: &str) -> Option<&ResolvedProvider> {
        let provider: OAuthProvider = name.parse().ok()?;
        self.providers.get(&provider)
    }

    fn require_provider(&self, provider: OAuthProvider) -> anyhow::Result<&ResolvedProvider> {
        self.providers
            .get(&provider)
            .ok_or_else(|| FossfundError::ProviderNotExist(provider.to_string()).into())
    }

    /// Generate authorization URL for a provider
    ///
    /// Returns the URL and the state stored for the callback.
    pub async fn get_authorization_url(
        &self,
        provider: OAuthProvider,
        redirect_uri: &str,
    ) -> anyhow::Result<(String, String)> {
        let config = self.require_provider(provider)?;

        let state = generate_random_string(STATE_LEN);
        self.state_cache
            .insert(
                state.clone(),
                OAuthState {
                    provider,
                    redirect_uri: redirect_uri.to_string(),
                },
            )
            .await;

        let mut url = url::Url::parse(&config.authorize_endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("state", &state);
            if !config.scopes.is_empty() {
                query.append_pair("scope", &config.scopes.join(" "));
            }
        }

        debug!(%provider, "Generated authorization URL");
        Ok((url.to_string(), state))
    }

    /// Validate and consume an authorization state
    ///
    /// A state is valid once, for the provider it was issued for.
    pub async fn take_state(&self, provider: OAuthProvider, state: &str) -> anyhow::Result<OAuthState> {
        let oauth_state = self
            .state_cache
            .remove(state)
            .await
            .ok_or_else(|| FossfundError::AuthError("Invalid or expired OAuth state".to_string()))?;

        if oauth_state.provider != provider {
            return Err(FossfundError::AuthError("State provider mismatch".to_string()).into());
        }

        Ok(oauth_state)
    }

    /// Exchange authorization code for tokens
    ///
    /// `redirect_uri` must be the one the state was issued with.
    pub async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
        state: &str,
    ) -> anyhow::Result<TokenResponse> {
        let oauth_state = self.take_state(provider, state).await?;
        if oauth_state.redirect_uri != redirect_uri {
            warn!(%provider, "OAuth callback redirect URI does not match the issued state");
            return Err(FossfundError::AuthError("Redirect URI mismatch".to_string()).into());
        }

        let config = self.require_provider(provider)?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&config.token_endpoint)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%provider, "Token exchange failed: {}", error_text);
            return Err(
                FossfundError::AuthError(format!("Token exchange failed: {}", error_text)).into(),
            );
        }

        let token_response: TokenResponse = response.json().await?;
        info!(%provider, "Exchanged code for access token");

        Ok(token_response)
    }

    /// Get user info from provider
    pub async fn get_user_info(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> anyhow::Result<OAuthUserInfo> {
        let config = self.require_provider(provider)?;

        let response = self
            .http_client
            .get(&config.userinfo_endpoint)
            .header(ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(
                FossfundError::AuthError(format!("Failed to get user info: {}", error_text))
                    .into(),
            );
        }

        let raw_claims: HashMap<String, serde_json::Value> = response.json().await?;

        let provider_user_id = claim_as_string(&raw_claims, &config.user_id_claim)
            .ok_or_else(|| {
                FossfundError::AuthError(format!(
                    "User info has no '{}' claim",
                    config.user_id_claim
                ))
            })?;

        Ok(OAuthUserInfo {
            provider,
            provider_user_id,
            raw_claims,
        })
    }
}

/// Read a claim as a string; numeric ids are converted
fn claim_as_string(claims: &HashMap<String, serde_json::Value>, claim: &str) -> Option<String> {
    match claims.get(claim)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generate a random alphanumeric string for state values
fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
