//! Session service
//!
//! Sessions live in the database. The client only holds the session id,
//! sealed with AES-256-GCM in the session cookie.

use tracing::{debug, info};

use fossfund_common::crypto::CookieSealer;
use fossfund_persistence::traits::UserPersistence;

use crate::model::AuthContext;
use crate::service::oauth::OAuthUserInfo;

/// Opens, resolves and closes sessions
#[derive(Debug)]
pub struct SessionService {
    sealer: CookieSealer,
}

impl SessionService {
    pub fn new(sealer: CookieSealer) -> Self {
        Self { sealer }
    }

    /// Create the service from the URL-safe base64 session secret
    pub fn from_secret(secret: &str) -> anyhow::Result<Self> {
        Ok(Self::new(CookieSealer::from_base64_key(secret)?))
    }

    /// Log in the user behind an OAuth identity
    ///
    /// The user is created on first login. Returns the sealed cookie value
    /// of the new session.
    pub async fn login<P>(&self, store: &P, identity: &OAuthUserInfo) -> anyhow::Result<String>
    where
        P: UserPersistence + ?Sized,
    {
        let user = match store
            .user_find_by_provider(identity.provider, &identity.provider_user_id)
            .await?
        {
            Some(user) => user,
            None => {
                store
                    .user_create(identity.provider, &identity.provider_user_id)
                    .await?
            }
        };

        let ses_id = store.session_create(user.user_id).await?;
        info!(user_id = user.user_id, provider = %identity.provider, "User logged in");

        Ok(self.sealer.seal(&ses_id)?)
    }

    /// Resolve a session cookie into an authentication context
    ///
    /// A cookie that cannot be unsealed, or whose session no longer exists,
    /// yields an anonymous context.
    pub async fn resolve<P>(&self, store: &P, cookie_value: &str) -> anyhow::Result<AuthContext>
    where
        P: UserPersistence + ?Sized,
    {
        let ses_id = match self.sealer.unseal(cookie_value) {
            Ok(ses_id) => ses_id,
            Err(e) => {
                debug!("Ignoring session cookie: {}", e);
                return Ok(AuthContext::anonymous());
            }
        };

        Ok(match store.session_find_user(&ses_id).await? {
            Some(user) => AuthContext::logged_in(user, ses_id),
            None => AuthContext::anonymous(),
        })
    }

    /// Close the session of a context, if it has one
    pub async fn logout<P>(&self, store: &P, context: &AuthContext) -> anyhow::Result<bool>
    where
        P: UserPersistence + ?Sized,
    {
        match context.session_id.as_deref() {
            Some(ses_id) => {
                let deleted = store.session_delete(ses_id).await?;
                info!(user_id = ?context.user_id(), "User logged out");
                Ok(deleted)
            }
            None => Ok(false),
        }
    }
}
