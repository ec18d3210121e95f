// Session middleware for Actix-web
// Resolves the session cookie and attaches the AuthContext to every request

use std::rc::Rc;

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web::Data,
};
use futures::future::LocalBoxFuture;

use fossfund_auth::AuthContext;
use fossfund_common::SESSION_COOKIE;

use crate::model::AppState;

// Session middleware transformer
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

/// Resolve the request's session cookie
///
/// Lookup failures are logged and leave the request anonymous.
async fn resolve_context(state: &AppState, cookie_value: &str) -> AuthContext {
    match state
        .session_service
        .resolve(state.persistence.as_ref(), cookie_value)
        .await
    {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!("Failed to resolve session: {}", e);
            AuthContext::anonymous()
        }
    }
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let cookie = req.cookie(SESSION_COOKIE);
            let state = req.app_data::<Data<AppState>>().cloned();

            let auth_context = match (cookie, state) {
                (Some(cookie), Some(state)) => resolve_context(&state, cookie.value()).await,
                (Some(_), None) => {
                    tracing::error!("AppState not found in request app_data");
                    AuthContext::anonymous()
                }
                (None, _) => AuthContext::anonymous(),
            };

            // Always insert AuthContext so handlers can rely on it
            req.extensions_mut().insert(auth_context);

            service.call(req).await
        })
    }
}
