use reqwest::Method;

use server::gateway::AuthContext;

use crate::common::{ANONYMOUS_TOKEN, BYPASS_TOKEN, REJECTED_TOKEN, TestApp, VALID_TOKEN, routes};

mod gateway {
    use super::*;

    #[tokio::test]
    async fn valid_bearer_token_is_verified_once() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FORMATS, Some(VALID_TOKEN)))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(app.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn missing_header_is_rejected_without_calling_verifier() {
        let app = TestApp::spawn().await;

        let res = app.send(app.request(Method::GET, routes::FILES, None)).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert!(res.body["error"].is_string());
        assert_eq!(app.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn bypass_token_skips_verifier() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FILES, Some(BYPASS_TOKEN)))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(app.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected_without_calling_verifier() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FILES, Some("Token abc")))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(app.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn valid_token_without_user_id_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FORMATS, Some(ANONYMOUS_TOKEN)))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(app.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn token_reported_invalid_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FILES, Some(REJECTED_TOKEN)))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
        assert_eq!(app.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn verifier_error_status_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .send(app.request(Method::GET, routes::FILES, Some("Bearer unknown")))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn unreachable_verifier_fails_closed() {
        let app = TestApp::spawn_with(Some("http://127.0.0.1:1".into())).await;

        let res = app
            .send(app.request(Method::GET, routes::FILES, Some(VALID_TOKEN)))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn cors_preflight_needs_no_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .send(
                app.request(Method::OPTIONS, routes::FILES, None)
                    .header("Origin", "http://editor.example.com")
                    .header("Access-Control-Request-Method", "POST"),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(app.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn preflight_skips_the_gateway_without_cors_layer() {
        let app = TestApp::spawn().await;
        let addr = app.spawn_api_only(None).await;

        let res = app
            .send(
                app.client
                    .request(Method::OPTIONS, format!("http://{addr}{}", routes::FILES))
                    .header("Authorization", "Bearer not-a-real-token")
                    .header("Origin", "http://editor.example.com")
                    .header("Access-Control-Request-Method", "POST"),
            )
            .await;

        assert_ne!(res.status, 401);
        assert_eq!(app.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn options_without_preflight_headers_is_still_authenticated() {
        let app = TestApp::spawn().await;
        let addr = app.spawn_api_only(None).await;

        let res = app
            .send(
                app.client
                    .request(Method::OPTIONS, format!("http://{addr}{}", routes::FILES))
                    .header("Authorization", "Bearer not-a-real-token"),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(app.verifier.calls(), 1);
    }

    #[tokio::test]
    async fn attached_context_passes_without_credentials() {
        let app = TestApp::spawn().await;
        let addr = app.spawn_api_only(Some(AuthContext::Internal)).await;

        let res = app
            .send(app.client.get(format!("http://{addr}{}", routes::FORMATS)))
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body.is_array());
        assert_eq!(app.verifier.calls(), 0);
    }
}
