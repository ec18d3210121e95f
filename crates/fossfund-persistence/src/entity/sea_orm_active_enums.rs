//! PostgreSQL enum types used by the schema

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// OAuth provider that authenticated a user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "oauthprovider")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    #[sea_orm(string_value = "github")]
    Github,
    #[sea_orm(string_value = "bitbucket")]
    Bitbucket,
    #[sea_orm(string_value = "google")]
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Github => "github",
            OAuthProvider::Bitbucket => "bitbucket",
            OAuthProvider::Google => "google",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(OAuthProvider::Github),
            "bitbucket" => Ok(OAuthProvider::Bitbucket),
            "google" => Ok(OAuthProvider::Google),
            _ => Err(format!("Invalid OAuth provider: {}", s)),
        }
    }
}

/// Primary payment service of a donation URL
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "urltype")]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    #[sea_orm(string_value = "paypal")]
    Paypal,
    #[sea_orm(string_value = "patreon")]
    Patreon,
    #[sea_orm(string_value = "liberapay")]
    Liberapay,
    #[sea_orm(string_value = "opencollective")]
    Opencollective,
    #[sea_orm(string_value = "other")]
    Other,
}
