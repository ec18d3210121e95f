// Error handling for the fossfund server
// Maps domain errors to HTTP responses and renders the 404/500 error pages

use std::fmt::{Display, Formatter};

use actix_web::{
    HttpResponse,
    body::MessageBody,
    dev::ServiceResponse,
    http::StatusCode,
    middleware::{ErrorHandlerResponse, ErrorHandlers},
};
use tracing::error;

pub use fossfund_common::error::{
    ACCESS_DENIED, ErrorCode, FossfundError, MEDIA_TYPE_ERROR, PAGE_ERROR,
    PARAMETER_VALIDATE_ERROR, PAYLOAD_TOO_LARGE, PROJECT_NOT_EXIST, PROVIDER_NOT_EXIST,
    ORGANISATION_NOT_EXIST, SERVER_ERROR,
};

use crate::model::response as common;

// Local wrapper for application errors to implement actix-web error handling
// (Cannot impl foreign trait for foreign type due to orphan rules)
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<FossfundError> for AppError {
    fn from(value: FossfundError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// HTTP status, application error code and message for this error
    fn parts(&self) -> (StatusCode, i32, String) {
        let Some(e) = self.downcast_ref::<FossfundError>() else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                SERVER_ERROR.code,
                self.inner.to_string(),
            );
        };

        let (status, code) = match e {
            FossfundError::IllegalArgument(_) => {
                (StatusCode::BAD_REQUEST, PARAMETER_VALIDATE_ERROR.code)
            }
            FossfundError::InvalidPage(_) => (StatusCode::BAD_REQUEST, PAGE_ERROR.code),
            FossfundError::PageNotExist(_) => (StatusCode::NOT_FOUND, PAGE_ERROR.code),
            FossfundError::ProjectNotExist(_) => (StatusCode::NOT_FOUND, PROJECT_NOT_EXIST.code),
            FossfundError::OrganisationNotExist(_) => {
                (StatusCode::NOT_FOUND, ORGANISATION_NOT_EXIST.code)
            }
            FossfundError::InvalidLogo(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, MEDIA_TYPE_ERROR.code)
            }
            FossfundError::LogoTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE.code)
            }
            FossfundError::ProviderNotExist(_) => {
                (StatusCode::NOT_FOUND, PROVIDER_NOT_EXIST.code)
            }
            FossfundError::AuthError(_) => (StatusCode::UNAUTHORIZED, ACCESS_DENIED.code),
            FossfundError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.code),
        };

        (status, code, e.to_string())
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code, message) = self.parts();
        common::Result::<Option<()>>::http_response(status.as_u16(), code, message, None)
    }
}

/// Error page middleware for 404 and 500 responses
///
/// Whatever produced the response (an unknown route, a missing record, a
/// failing handler), the body is replaced by the standard error page.
pub fn error_pages<B: MessageBody + 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, render_error_page)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_error_page)
}

fn render_error_page<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let status = res.status();

    if status.is_server_error() {
        match res.response().error() {
            Some(e) => error!(path = %res.request().path(), "Request failed: {}", e),
            None => error!(path = %res.request().path(), "Request failed"),
        }
    }

    let (req, _) = res.into_parts();
    let response = error_page_response(status);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

/// Standard error page: the status code and its reason phrase
pub fn error_page_response(status: StatusCode) -> HttpResponse {
    common::Result::<Option<()>>::http_response(
        status.as_u16(),
        status.as_u16() as i32,
        status.canonical_reason().unwrap_or_default().to_string(),
        None,
    )
}
