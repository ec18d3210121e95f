//! HTTP tests for `/static`

mod common;

use actix_web::{
    http::{StatusCode, header},
    test,
};

use common::{PNG, TestContext};

const CSS: &[u8] = b"body { margin: 0 }";
const CSS_GZ: &[u8] = b"\x1f\x8b\x08\x00gzipped-css";

fn write(ctx: &TestContext, relative: &str, data: &[u8]) {
    let path = ctx.static_dir.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, data).unwrap();
}

#[actix_web::test]
async fn test_prefers_precompressed_file() {
    let ctx = TestContext::new().await;
    write(&ctx, "css/site.css", CSS);
    write(&ctx, "css/site.css.gz", CSS_GZ);
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/static/css/site.css")
        .insert_header((header::ACCEPT_ENCODING, "gzip, deflate"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_ENCODING).unwrap(), "gzip");
    assert_eq!(resp.headers().get(header::VARY).unwrap(), "Accept-Encoding");
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/css; charset=utf-8"
    );
    assert_eq!(test::read_body(resp).await.as_ref(), CSS_GZ);

    let req = test::TestRequest::get().uri("/static/css/site.css").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::CONTENT_ENCODING).is_none());
    assert_eq!(resp.headers().get(header::VARY).unwrap(), "Accept-Encoding");
    assert_eq!(test::read_body(resp).await.as_ref(), CSS);
}

#[actix_web::test]
async fn test_plain_file_without_gzip_variant() {
    let ctx = TestContext::new().await;
    write(&ctx, "js/app.js", b"console.log(1)");
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/static/js/app.js")
        .insert_header((header::ACCEPT_ENCODING, "gzip"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::CONTENT_ENCODING).is_none());
    assert!(resp.headers().get(header::VARY).is_none());
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/javascript; charset=utf-8"
    );
}

#[actix_web::test]
async fn test_logo_content_type_is_sniffed() {
    let ctx = TestContext::new().await;
    write(&ctx, "organisation/4", PNG);
    write(&ctx, "project/5", b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>");
    write(&ctx, "project/6", b"plain bytes");
    let app = test_app!(ctx);

    for (uri, content_type) in [
        ("/static/organisation/4", "image/png"),
        ("/static/project/5", "image/svg+xml"),
        ("/static/project/6", "application/octet-stream"),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), content_type);
    }
}

#[actix_web::test]
async fn test_missing_files_are_not_found() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    for uri in [
        "/static/css/missing.css",
        "/static/project",
        "/static/../Cargo.toml",
        "/static/project/%2E%2E/%2E%2E/Cargo.toml",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_large_file_is_streamed_whole() {
    let ctx = TestContext::new().await;
    let mut logo = PNG.to_vec();
    logo.extend((0..200_000).map(|i| (i % 251) as u8));
    write(&ctx, "project/9", &logo);
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/static/project/9").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(
        resp.headers().get(header::CONTENT_LENGTH).unwrap(),
        logo.len().to_string().as_str()
    );
    assert_eq!(test::read_body(resp).await.as_ref(), logo.as_slice());
}
