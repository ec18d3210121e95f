//! OAuth login and session endpoints

use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite},
    get,
    http::header,
    web,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use fossfund_auth::{LoginProvider, PARAM_CODE, PARAM_STATE};
use fossfund_common::{FossfundError, SESSION_COOKIE};
use fossfund_persistence::UserInfo;

use crate::{
    api::auth_context,
    error::AppError,
    middleware::forwarded::ClientInfo,
    model::{
        AppState,
        response::{self, redirect},
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginView {
    providers: Vec<LoginProvider>,
    user: Option<UserInfo>,
}

/// Query of the provider's redirect back to the login URL
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish()
}

/// Options to log in with the configured providers
#[get("/login")]
async fn login(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let providers = data
        .oauth_service
        .get_enabled_providers()
        .into_iter()
        .map(|p| LoginProvider::new(p.as_str()))
        .collect();

    response::Result::<LoginView>::http_success(LoginView {
        providers,
        user: auth_context(&req).user,
    })
}

/// Redirect to the provider, or complete the login when it redirects back
#[get("/login/{provider}")]
async fn oauth_login(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, AppError> {
    if auth_context(&req).is_logged_in() {
        return Ok(redirect("/"));
    }

    let name = path.into_inner();
    let provider = data
        .oauth_service
        .provider(&name)
        .map(|p| p.provider)
        .ok_or(FossfundError::ProviderNotExist(name))?;

    let client = ClientInfo::from_request(&req, &data.trusted_proxies);
    let redirect_uri = format!(
        "{}://{}{}",
        client.scheme,
        data.configuration.app_host(),
        req.path()
    );

    if let Some(error) = &query.error {
        warn!(%provider, %error, "Provider refused authorization");
        return Err(FossfundError::AuthError(format!("authorization refused: {}", error)).into());
    }

    let Some(code) = query.code.as_deref() else {
        let (url, _state) = data
            .oauth_service
            .get_authorization_url(provider, &redirect_uri)
            .await?;
        return Ok(redirect(&url));
    };

    let state = query.state.as_deref().ok_or_else(|| {
        FossfundError::AuthError(format!("missing '{}' parameter", PARAM_STATE))
    })?;
    if code.is_empty() {
        return Err(FossfundError::AuthError(format!("empty '{}' parameter", PARAM_CODE)).into());
    }

    let token = data
        .oauth_service
        .exchange_code(provider, code, &redirect_uri, state)
        .await?;
    let identity = data
        .oauth_service
        .get_user_info(provider, &token.access_token)
        .await?;
    let sealed = data
        .session_service
        .login(data.persistence.as_ref(), &identity)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(session_cookie(sealed, client.scheme == "https"))
        .finish())
}

/// Close the current session
#[get("/logout")]
async fn logout(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let context = auth_context(&req);
    data.session_service
        .logout(data.persistence.as_ref(), &context)
        .await?;

    let mut cookie = session_cookie(String::new(), false);
    cookie.make_removal();

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish())
}

/// The logged in user
#[get("/me")]
async fn me(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = auth_context(&req)
        .user
        .ok_or_else(|| FossfundError::AuthError("not logged in".to_string()))?;

    Ok(response::Result::<UserInfo>::http_success(user))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/user")
        .service(login)
        .service(oauth_login)
        .service(logout)
        .service(me)
}
