//! User and session persistence trait

use async_trait::async_trait;

use crate::model::{OAuthProvider, UserInfo};

/// User and session persistence operations
#[async_trait]
pub trait UserPersistence: Send + Sync {
    /// Find a user by the identity their OAuth provider reports
    async fn user_find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<Option<UserInfo>>;

    /// Create a user for an OAuth identity
    async fn user_create(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<UserInfo>;

    /// Open a session for a user, returning the session ID
    async fn session_create(&self, user_id: i32) -> anyhow::Result<String>;

    /// Get the user a session belongs to
    async fn session_find_user(&self, ses_id: &str) -> anyhow::Result<Option<UserInfo>>;

    /// Close a session
    async fn session_delete(&self, ses_id: &str) -> anyhow::Result<bool>;
}
