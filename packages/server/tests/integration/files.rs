use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::common::{OWNER_ID, TestApp, VALID_TOKEN, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn original_upload_is_generation_one_and_dispatched_once() {
        let app = TestApp::spawn().await;

        let res = app.upload("docx", b"hello", None).await;

        assert_eq!(res.body["ownerId"], OWNER_ID);
        assert_eq!(res.body["generation"], 1);
        assert!(res.body["primaryFileId"].is_null());
        assert_eq!(res.body["content"], STANDARD.encode(b"hello"));
        assert!(
            res.body["resourcePath"]
                .as_str()
                .unwrap()
                .ends_with(".docx")
        );

        let dispatched = app.ingest.wait_for(1).await;
        assert_eq!(dispatched.len(), 1);
        let (auth, payload) = &dispatched[0];
        assert_eq!(auth.as_deref(), Some(VALID_TOKEN));
        assert_eq!(payload["ownerId"], OWNER_ID);
        assert_eq!(payload["generation"], 1);
        assert_eq!(payload["content"], STANDARD.encode(b"hello"));
    }

    #[tokio::test]
    async fn content_round_trips_with_format_mime_type() {
        let app = TestApp::spawn().await;
        let id = app.upload("txt", b"plain words", None).await.id();

        let res = app.get(&routes::file_content(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"plain words");
        assert_eq!(res.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn derived_upload_follows_primary_and_is_not_dispatched() {
        let app = TestApp::spawn().await;
        let original = app.upload("docx", b"v1", None).await.id();
        let second = app.upload("docx", b"v2", Some(original)).await;
        let third = app.upload("docx", b"v3", Some(second.id())).await;

        assert_eq!(second.body["generation"], 2);
        assert_eq!(second.body["primaryFileId"], original);
        assert_eq!(third.body["generation"], 3);
        assert_eq!(third.body["primaryFileId"], second.id());

        app.ingest.wait_for(1).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(app.ingest.received().len(), 1);
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found_and_writes_nothing() {
        let app = TestApp::spawn().await;
        let format_id = app.format_id("docx").await;

        let res = app
            .post_json(
                routes::FILES,
                &json!({"ownerId": 999, "formatId": format_id, "content": "aGVsbG8="}),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(app.stored_blob_count(), 0);
    }

    #[tokio::test]
    async fn unknown_primary_is_not_found() {
        let app = TestApp::spawn().await;
        let format_id = app.format_id("docx").await;

        let res = app
            .post_json(
                routes::FILES,
                &json!({
                    "ownerId": OWNER_ID,
                    "formatId": format_id,
                    "content": "aGVsbG8=",
                    "primaryFileId": 4242,
                }),
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn generation_disagreeing_with_primary_is_rejected() {
        let app = TestApp::spawn().await;
        let original = app.upload("docx", b"v1", None).await.id();
        let format_id = app.format_id("pdf").await;

        let res = app
            .post_json(
                routes::FILES,
                &json!({
                    "ownerId": OWNER_ID,
                    "formatId": format_id,
                    "content": "JVBERg==",
                    "primaryFileId": original,
                    "generation": 1,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn invalid_base64_and_empty_content_are_rejected() {
        let app = TestApp::spawn().await;
        let format_id = app.format_id("txt").await;

        for content in ["***not base64***", ""] {
            let res = app
                .post_json(
                    routes::FILES,
                    &json!({"ownerId": OWNER_ID, "formatId": format_id, "content": content}),
                )
                .await;
            assert_eq!(res.status, 400, "content {content:?}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn content_is_included_only_on_request() {
        let app = TestApp::spawn().await;
        let id = app.upload("txt", b"abc", None).await.id();

        let bare = app.get(&routes::file(id)).await;
        assert_eq!(bare.status, 200);
        assert!(bare.body["content"].is_null());

        let full = app.get(&format!("{}?content=true", routes::file(id))).await;
        assert_eq!(full.body["content"], STANDARD.encode(b"abc"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get(&routes::file(77)).await.status, 404);
        assert_eq!(app.get(&routes::file_content(77)).await.status, 404);
    }

    #[tokio::test]
    async fn list_returns_every_file() {
        let app = TestApp::spawn().await;
        app.upload("txt", b"a", None).await;
        app.upload("txt", b"b", None).await;

        let res = app.get(routes::FILES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 2);
    }

    #[tokio::test]
    async fn lineage_walks_back_to_the_original() {
        let app = TestApp::spawn().await;
        let original = app.upload("docx", b"v1", None).await.id();
        let second = app.upload("docx", b"v2", Some(original)).await.id();
        let third = app.upload("docx", b"v3", Some(second)).await.id();

        let res = app.get(&routes::file_lineage(third)).await;

        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res.body["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![third, second, original]);
    }
}

mod replace_and_delete {
    use super::*;

    #[tokio::test]
    async fn replacing_content_moves_the_key_and_frees_the_old_blob() {
        let app = TestApp::spawn().await;
        let uploaded = app.upload("txt", b"old", None).await;
        let id = uploaded.id();

        let res = app.put_bytes(&routes::file_content(id), b"new".to_vec()).await;
        assert_eq!(res.status, 204);

        let fetched = app.get(&routes::file(id)).await;
        assert_ne!(fetched.body["resourcePath"], uploaded.body["resourcePath"]);
        assert_eq!(fetched.body["generation"], 1);
        assert_eq!(app.get(&routes::file_content(id)).await.bytes, b"new");
        assert_eq!(app.stored_blob_count(), 1);
    }

    #[tokio::test]
    async fn empty_replacement_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.upload("txt", b"old", None).await.id();

        let res = app.put_bytes(&routes::file_content(id), Vec::new()).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn delete_removes_derived_generations() {
        let app = TestApp::spawn().await;
        let original = app.upload("docx", b"v1", None).await.id();
        let derived = app.upload("docx", b"v2", Some(original)).await.id();
        let other = app.upload("txt", b"keep me", None).await.id();

        let res = app.delete(&routes::file(original)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::file(original)).await.status, 404);
        assert_eq!(app.get(&routes::file(derived)).await.status, 404);
        assert_eq!(app.get(&routes::file(other)).await.status, 200);
        assert_eq!(app.stored_blob_count(), 1);

        assert_eq!(app.delete(&routes::file(original)).await.status, 404);
    }
}

mod conversion {
    use super::*;

    #[tokio::test]
    async fn rendered_pdf_becomes_the_next_generation_without_dispatch() {
        let app = TestApp::spawn().await;
        let original = app.upload("docx", b"hello", None).await.id();
        app.ingest.wait_for(1).await;

        let res = app
            .send(app.request(reqwest::Method::POST, &routes::file_pdf(original), Some(VALID_TOKEN)))
            .await;

        assert_eq!(res.status, 201, "render failed: {}", res.body);
        assert_eq!(res.body["generation"], 2);
        assert_eq!(res.body["primaryFileId"], original);
        assert!(res.body["resourcePath"].as_str().unwrap().ends_with(".pdf"));

        let pdf = app.get(&routes::file_content(res.id())).await;
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.content_type.as_deref(), Some("application/pdf"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(app.ingest.received().len(), 1);
    }

    #[tokio::test]
    async fn pdf_of_unsupported_format_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.upload("txt", b"plain", None).await.id();

        let res = app
            .send(app.request(reqwest::Method::POST, &routes::file_pdf(id), Some(VALID_TOKEN)))
            .await;

        assert_eq!(res.status, 415);
        assert_eq!(res.body["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn text_file_edits_round_trip_through_editable_form() {
        let app = TestApp::spawn().await;
        let id = app.upload("txt", b"line one\nline two", None).await.id();

        let res = app.get(&routes::file_editable(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(
            res.body["sections"][0]["blocks"][1]["inlines"][0]["text"],
            "line two"
        );

        let edited = json!({
            "sections": [{"blocks": [
                {"inlines": [{"text": "alpha"}]},
                {"inlines": [{"text": "be"}, {"text": "ta"}]},
            ]}]
        });
        let res = app.put_json(&routes::file_editable(id), &edited).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::file_content(id)).await.bytes, b"alpha\nbeta");
    }

    #[tokio::test]
    async fn editable_form_of_pdf_is_unsupported() {
        let app = TestApp::spawn().await;
        let id = app.upload("pdf", b"%PDF-1.7", None).await.id();

        let res = app.get(&routes::file_editable(id)).await;

        assert_eq!(res.status, 415);
    }
}
