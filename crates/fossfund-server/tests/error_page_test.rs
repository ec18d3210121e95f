//! The 404 and 500 error pages

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::Value;

use common::TestContext;

#[actix_web::test]
async fn test_unknown_route() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/no/such/page").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"code": 404, "message": "Not Found", "data": null})
    );
}

#[actix_web::test]
async fn test_missing_record_uses_error_page() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/organisation/42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Not Found");
}

#[actix_web::test]
async fn test_database_failure() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    ctx.store.fail();

    for uri in ["/", "/project", "/organisation/1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Internal Server Error");
    }
}

#[actix_web::test]
async fn test_client_errors_keep_their_message() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/project?page=0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid page: 0");
}
