use std::sync::Arc;

use reqwest::Method;
use server::config::IngestConfig;
use server::ingest::ModelCatalog;

use crate::common::{BYPASS_TOKEN, TestApp, VALID_TOKEN, routes, serve};

#[tokio::test]
async fn available_models_are_proxied_with_caller_auth() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::AVAILABLE_MODELS).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body[0]["id"], 4);
    assert_eq!(res.body[0]["name"], "invoice-v2");
    assert_eq!(res.body[1]["name"], "receipt");
    assert!(res.body[1].get("description").is_none());
    assert_eq!(app.ingest.catalog_lookups(), vec![Some(VALID_TOKEN.to_string())]);
}

#[tokio::test]
async fn bypass_caller_auth_is_forwarded_verbatim() {
    let app = TestApp::spawn().await;

    let res = app
        .send(app.request(Method::GET, routes::AVAILABLE_MODELS, Some(BYPASS_TOKEN)))
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(app.ingest.catalog_lookups(), vec![Some(BYPASS_TOKEN.to_string())]);
}

#[tokio::test]
async fn catalog_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .send(app.request(Method::GET, routes::AVAILABLE_MODELS, None))
        .await;

    assert_eq!(res.status, 401);
    assert!(app.ingest.catalog_lookups().is_empty());
}

#[tokio::test]
async fn unreachable_catalog_is_a_bad_gateway() {
    let app = TestApp::spawn().await;
    let mut state = app.state.clone();
    state.catalog = Arc::new(
        ModelCatalog::new(&IngestConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_ms: 300,
            ..IngestConfig::default()
        })
        .unwrap(),
    );
    let addr = serve(server::build_router(state)).await;

    let res = app
        .send(
            app.client
                .get(format!("http://{addr}{}", routes::AVAILABLE_MODELS))
                .header("Authorization", VALID_TOKEN),
        )
        .await;

    assert_eq!(res.status, 502);
    assert_eq!(res.body["code"], "UPSTREAM_ERROR");
}
