//! HTTP API handlers

use actix_web::{HttpMessage, HttpRequest};
use serde::Deserialize;

use fossfund_auth::AuthContext;
use fossfund_common::parse_page;

pub mod index;
pub mod organisation;
pub mod project;
pub mod route;
pub mod static_files;
pub mod user;

/// Authentication context attached by the session middleware
pub fn auth_context(req: &HttpRequest) -> AuthContext {
    req.extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_default()
}

/// Parse a record id from the path; anything but an integer is not found
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

/// `?page=N` of the catalogue listings
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        parse_page(self.page.as_deref())
    }
}
