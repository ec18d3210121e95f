//! HTTP response types for the fossfund server
//!
//! Every JSON body uses the same `{code, message, data}` envelope.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode, http::header};
use serde::{Deserialize, Serialize};

use fossfund_common::error::SUCCESS;

/// Generic result wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: SUCCESS.code,
            message: SUCCESS.message.to_string(),
            data,
        }
    }

    pub fn http_success(data: impl Serialize) -> HttpResponse {
        HttpResponse::Ok().json(Result::success(data))
    }

    /// Successful response carrying an informational message
    pub fn http_message(message: &str, data: impl Serialize) -> HttpResponse {
        HttpResponse::Ok().json(Result::new(0, message.to_string(), data))
    }

    pub fn http_response(status: u16, code: i32, message: String, data: T) -> HttpResponse
    where
        T: Serialize,
    {
        HttpResponseBuilder::new(StatusCode::from_u16(status).unwrap_or_default())
            .json(Result::new(code, message, data))
    }
}

/// `302 Found` redirect to a local path
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
