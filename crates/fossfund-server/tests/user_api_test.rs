//! HTTP tests for login, logout and the session cookie

mod common;

use std::collections::HashMap;

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, cookie::Cookie, dev::ServerHandle,
    http::{StatusCode, header},
    test, web,
};
use serde_json::{Value, json};

use fossfund_common::SESSION_COOKIE;

use common::{TestContext, location};

#[actix_web::test]
async fn test_login_lists_providers() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/user/login").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["data"]["providers"],
        serde_json::json!([{"name": "github", "loginUrl": "/user/login/github"}])
    );
    assert_eq!(body["data"]["user"], Value::Null);
}

#[actix_web::test]
async fn test_unknown_or_disabled_provider() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    for uri in ["/user/login/gitlab", "/user/login/google"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_login_redirects_to_provider() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/user/login/github").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let url = location(&resp);
    assert!(url.starts_with("https://github.com/login/oauth/authorize?"), "{}", url);
    assert!(url.contains("client_id=test-client"), "{}", url);
    assert!(
        url.contains("redirect_uri=http%3A%2F%2Ffossfund.test%2Fuser%2Flogin%2Fgithub"),
        "{}",
        url
    );
    assert!(url.contains("state="), "{}", url);
}

#[actix_web::test]
async fn test_callback_errors() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/user/login/github?code=abc&state=bogus")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid or expired OAuth state");

    let req = test::TestRequest::get()
        .uri("/user/login/github?code=abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/user/login/github?error=access_denied")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_requires_session() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/user/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let sealed = ctx.login("1234").await;
    let req = test::TestRequest::get()
        .uri("/user/me")
        .cookie(Cookie::new(SESSION_COOKIE, sealed))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["provider"], "github");
    assert_eq!(body["data"]["providerUserID"], "1234");
}

#[actix_web::test]
async fn test_logged_in_user_is_not_sent_to_provider() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let sealed = ctx.login("1234").await;
    let req = test::TestRequest::get()
        .uri("/user/login/github")
        .cookie(Cookie::new(SESSION_COOKIE, sealed.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    // Views carry the user too
    let req = test::TestRequest::get()
        .uri("/user/login")
        .cookie(Cookie::new(SESSION_COOKIE, sealed))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["providerUserID"], "1234");
}

#[actix_web::test]
async fn test_logout_closes_session() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let sealed = ctx.login("1234").await;
    assert_eq!(ctx.store.session_count(), 1);

    let req = test::TestRequest::get()
        .uri("/user/logout")
        .cookie(Cookie::new(SESSION_COOKIE, sealed.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cookie.value(), "");
    assert_eq!(ctx.store.session_count(), 0);

    // The old cookie no longer resolves to a user
    let req = test::TestRequest::get()
        .uri("/user/me")
        .cookie(Cookie::new(SESSION_COOKIE, sealed))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_without_session() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/user/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_tampered_cookie_is_anonymous() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(SESSION_COOKIE, "not-a-sealed-value"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"], Value::Null);
}

const AUTH_CODE: &str = "provider-code";
const ACCESS_TOKEN: &str = "provider-token";
const BITBUCKET_UUID: &str = "{d301aafa-d676-4ee0-88be-962be7417567}";

async fn token_endpoint(form: web::Form<HashMap<String, String>>) -> HttpResponse {
    let valid = form.get("grant_type").map(String::as_str) == Some("authorization_code")
        && form.get("code").map(String::as_str) == Some(AUTH_CODE)
        && form.get("client_secret").is_some_and(|s| !s.is_empty());
    if !valid {
        return HttpResponse::BadRequest().body("bad_verification_code");
    }
    HttpResponse::Ok().json(json!({"access_token": ACCESS_TOKEN, "token_type": "bearer"}))
}

fn authorized(req: &HttpRequest) -> bool {
    let expected = format!("Bearer {}", ACCESS_TOKEN);
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

async fn github_user(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!({"id": 583231, "login": "octocat"}))
}

async fn bitbucket_user(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!({"uuid": BITBUCKET_UUID, "username": "octocat"}))
}

/// Serve token and user info endpoints on a local port
fn start_provider() -> (String, ServerHandle) {
    let server = HttpServer::new(|| {
        App::new()
            .route("/token", web::post().to(token_endpoint))
            .route("/github/user", web::get().to(github_user))
            .route("/bitbucket/user", web::get().to(bitbucket_user))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let base = format!("http://{}", server.addrs()[0]);
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (base, handle)
}

fn state_param(url: &str) -> String {
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("state="))
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_callback_logs_in() {
    let (base, provider) = start_provider();
    let token = format!("{}/token", base);
    let github_userinfo = format!("{}/github/user", base);
    let bitbucket_userinfo = format!("{}/bitbucket/user", base);

    let ctx = TestContext::with_overrides(&[
        ("oauth.providers.github.token_endpoint", token.as_str()),
        ("oauth.providers.github.userinfo_endpoint", github_userinfo.as_str()),
        ("oauth.providers.bitbucket.client_id", "bb-client"),
        ("oauth.providers.bitbucket.client_secret", "bb-secret"),
        ("oauth.providers.bitbucket.token_endpoint", token.as_str()),
        ("oauth.providers.bitbucket.userinfo_endpoint", bitbucket_userinfo.as_str()),
    ])
    .await;
    let app = test_app!(ctx);

    for (n, (name, provider_user_id)) in [("github", "583231"), ("bitbucket", BITBUCKET_UUID)]
        .into_iter()
        .enumerate()
    {
        let req = test::TestRequest::get()
            .uri(&format!("/user/login/{}", name))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", name);
        let state = state_param(&location(&resp));

        let req = test::TestRequest::get()
            .uri(&format!("/user/login/{}?code={}&state={}", name, AUTH_CODE, state))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", name);
        assert_eq!(location(&resp), "/");

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(set_cookie.starts_with("session="), "{}", set_cookie);
        let sealed = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap()
            .value()
            .to_string();
        assert!(!sealed.is_empty());

        let users = ctx.store.users();
        assert_eq!(users.len(), n + 1);
        assert_eq!(users[n].provider_user_id.as_deref(), Some(provider_user_id));

        let req = test::TestRequest::get()
            .uri("/user/me")
            .cookie(Cookie::new(SESSION_COOKIE, sealed))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["provider"], name);
        assert_eq!(body["data"]["providerUserID"], provider_user_id);
    }

    // The same identity logs in to the same user
    let req = test::TestRequest::get().uri("/user/login/github").to_request();
    let resp = test::call_service(&app, req).await;
    let state = state_param(&location(&resp));
    let req = test::TestRequest::get()
        .uri(&format!("/user/login/github?code={}&state={}", AUTH_CODE, state))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(ctx.store.users().len(), 2);
    assert_eq!(ctx.store.session_count(), 3);

    provider.stop(true).await;
}

#[actix_web::test]
async fn test_callback_with_rejected_code() {
    let (base, provider) = start_provider();
    let token = format!("{}/token", base);
    let ctx = TestContext::with_overrides(&[("oauth.providers.github.token_endpoint", token.as_str())])
        .await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/user/login/github").to_request();
    let resp = test::call_service(&app, req).await;
    let state = state_param(&location(&resp));

    let req = test::TestRequest::get()
        .uri(&format!("/user/login/github?code=wrong&state={}", state))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.response().cookies().next().is_none());
    assert!(ctx.store.users().is_empty());

    provider.stop(true).await;
}
