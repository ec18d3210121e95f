//! Error types and error codes for fossfund
//!
//! This module defines:
//! - `FossfundError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum FossfundError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("Invalid page: {0}")]
    InvalidPage(i64),

    #[error("Page {0} does not exist")]
    PageNotExist(u64),

    #[error("project '{0}' does not exist")]
    ProjectNotExist(i32),

    #[error("organisation '{0}' does not exist")]
    OrganisationNotExist(i32),

    #[error("{0}")]
    InvalidLogo(String),

    #[error("Logo too large - max allowed is {}KB", .0 / 1024)]
    LogoTooLarge(usize),

    #[error("OAuth provider '{0}' does not exist")]
    ProviderNotExist(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const MEDIA_TYPE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20003,
    message: "MediaType Error",
};

pub const PAYLOAD_TOO_LARGE: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "payload too large",
};

pub const PAGE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 21000,
    message: "page error",
};

pub const PROJECT_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 22001,
    message: "project not exist",
};

pub const ORGANISATION_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 22002,
    message: "organisation not exist",
};

pub const PROVIDER_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 23001,
    message: "oauth provider not exist",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
