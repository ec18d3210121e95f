//! fossfund common - shared types and utilities
//!
//! This crate provides the foundational types used across all fossfund components:
//! - Error types and error codes
//! - Session cookie sealing
//! - Form text helpers
//! - Common constants

pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorCode, FossfundError};
pub use utils::{clean_text, is_http_url, parse_page};

/// Name of the cookie carrying the sealed session id
pub const SESSION_COOKIE: &str = "session";

/// Maximum length of a record name
pub const NAME_MAX_LEN: usize = 40;

/// Minimum length of a record description
pub const DESC_MIN_LEN: usize = 15;

/// Maximum length of a record description
pub const DESC_MAX_LEN: usize = 300;

/// Number of projects shown on the index page
pub const INDEX_PROJECT_COUNT: u64 = 3;

/// Form field names
pub const PROJ_ID: &str = "projID";
pub const ORG_ID: &str = "orgID";
pub const NAME: &str = "name";
pub const DESC: &str = "desc";
pub const HOMEPAGE: &str = "homepage";
pub const LOGO: &str = "logo";
pub const REMOVE_LOGO: &str = "removeLogo";

/// Kinds of records that can carry a logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Project,
    Organisation,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Project => "project",
            RecordKind::Organisation => "organisation",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(RecordKind::Project),
            "organisation" => Ok(RecordKind::Organisation),
            _ => Err(format!("Invalid record kind: {}", s)),
        }
    }
}
