//! Authentication models

use serde::{Deserialize, Serialize};

use fossfund_persistence::model::UserInfo;

pub const LOGIN_PATH: &str = "/user/login";

/// Query parameter carrying the authorization code on the OAuth callback
pub const PARAM_CODE: &str = "code";

/// Query parameter carrying the CSRF state on the OAuth callback
pub const PARAM_STATE: &str = "state";

/// Authentication context attached to every request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    /// The logged in user, if the session cookie resolved to one
    pub user: Option<UserInfo>,
    /// Session id behind the cookie
    #[serde(skip)]
    pub session_id: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user: UserInfo, session_id: String) -> Self {
        Self {
            user: Some(user),
            session_id: Some(session_id),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

/// A provider offered on the login page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProvider {
    pub name: String,
    pub login_url: String,
}

impl LoginProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            login_url: format!("{}/{}", LOGIN_PATH, name),
        }
    }
}
