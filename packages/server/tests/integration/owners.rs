use serde_json::json;

use crate::common::{OWNER_ID, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_owner_is_created() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::OWNERS,
                &json!({"id": 42, "email": "answer@example.com", "firstName": "Deep"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["id"], 42);
        assert_eq!(res.body["firstName"], "Deep");

        let fetched = app.get(&routes::owner(42)).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["email"], "answer@example.com");
    }

    #[tokio::test]
    async fn registering_existing_owner_returns_stored_record() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::OWNERS,
                &json!({"id": OWNER_ID, "email": "someone-else@example.com"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], "seven@example.com");
    }

    #[tokio::test]
    async fn blank_email_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::OWNERS, &json!({"id": 43, "email": "  "}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::owner(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn owner_files_include_content_only_on_request() {
        let app = TestApp::spawn().await;
        app.upload("txt", b"first", None).await;
        app.upload("txt", b"second", None).await;

        let bare = app.get(&routes::owner_files(OWNER_ID)).await;
        assert_eq!(bare.status, 200);
        assert_eq!(bare.body["total"], 2);
        assert!(bare.body["files"][0]["content"].is_null());

        let full = app
            .get(&format!("{}?content=true", routes::owner_files(OWNER_ID)))
            .await;
        assert_eq!(full.body["files"][0]["content"], "Zmlyc3Q=");
        assert_eq!(full.body["files"][1]["content"], "c2Vjb25k");
    }

    #[tokio::test]
    async fn owner_without_files_lists_empty() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::owner_files(12345)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 0);
    }

    #[tokio::test]
    async fn formats_are_seeded() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::FORMATS).await;

        assert_eq!(res.status, 200);
        let codes: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["code"].as_str())
            .collect();
        for code in ["docx", "pdf", "txt", "png", "jpg"] {
            assert!(codes.contains(&code), "missing format {code}");
        }
    }
}
