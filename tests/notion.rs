//! Notion record store against a mock HTTP server.

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use jobsnap::store::Attachment;
use jobsnap::{ArchiveError, NewRecord, NotionConfig, NotionStore, RecordStore};
use serde_json::json;
use std::io::Write;

fn store_for(server: &MockServer) -> NotionStore {
    let config = NotionConfig::new("secret_test", "db1").with_base_url(server.url("/v1"));
    NotionStore::new(config).unwrap()
}

#[tokio::test]
async fn files_property_type_reads_schema() {
    let server = MockServer::start();
    let schema = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/databases/db1")
            .header("Authorization", "Bearer secret_test")
            .header("Notion-Version", "2022-06-28");
        then.status(200).json_body(json!({
            "id": "db1",
            "properties": {
                "Name": { "type": "title" },
                "Description": { "type": "files" },
                "Notes": { "type": "rich_text" }
            }
        }));
    });

    let store = store_for(&server);
    assert_eq!(
        store.files_property_type("Description").await.unwrap().as_deref(),
        Some("files")
    );
    assert_eq!(
        store.files_property_type("Notes").await.unwrap().as_deref(),
        Some("rich_text")
    );
    assert_eq!(store.files_property_type("Missing").await.unwrap(), None);
    schema.assert_hits(3);
}

#[tokio::test]
async fn upload_document_creates_then_sends() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/file_uploads")
            .json_body(json!({ "filename": "listing.pdf", "content_type": "application/pdf" }));
        then.status(200).json_body(json!({ "id": "up-42", "status": "pending" }));
    });
    let send = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/file_uploads/up-42/send")
            .body_contains("%PDF-1.4 fake");
        then.status(200).json_body(json!({ "id": "up-42", "status": "uploaded" }));
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listing.pdf");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"%PDF-1.4 fake")
        .unwrap();

    let id = store_for(&server).upload_document(&path).await.unwrap();
    assert_eq!(id, "up-42");
    create.assert();
    send.assert();
}

#[tokio::test]
async fn create_record_posts_properties_and_attachment() {
    let server = MockServer::start();
    let pages = server.mock(|when, then| {
        when.method(POST).path("/v1/pages").json_body(json!({
            "parent": { "database_id": "db1" },
            "properties": {
                "Name": { "title": [{ "type": "text", "text": { "content": "Engineer" } }] },
                "Company": { "rich_text": [{ "type": "text", "text": { "content": "Acme" } }] },
                "URL": { "url": "https://acme.com/jobs/1" },
                "Description": {
                    "type": "files",
                    "files": [{
                        "type": "file_upload",
                        "file_upload": { "id": "up-1" },
                        "name": "2024-01-01-Acme-Engineer.pdf"
                    }]
                }
            }
        }));
        then.status(200).json_body(json!({ "id": "page-7" }));
    });

    let record = NewRecord {
        title: "Engineer".into(),
        company: "Acme".into(),
        url: "https://acme.com/jobs/1".into(),
        attachment: Some(Attachment {
            property: "Description".into(),
            upload_id: "up-1".into(),
            name: "2024-01-01-Acme-Engineer.pdf".into(),
        }),
    };
    let id = store_for(&server).create_record(&record).await.unwrap();
    assert_eq!(id, "page-7");
    pages.assert();
}

#[tokio::test]
async fn rejected_request_maps_to_record_store_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/pages");
        then.status(400)
            .json_body(json!({ "object": "error", "code": "validation_error" }));
    });

    let record = NewRecord {
        title: "t".into(),
        company: "c".into(),
        url: "https://c.com".into(),
        attachment: None,
    };
    let err = store_for(&server).create_record(&record).await.unwrap_err();
    match err {
        ArchiveError::RecordStore { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("validation_error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn pending_descriptions_follows_cursor() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST).path("/v1/databases/db1/query").json_body(json!({
            "filter": { "property": "Status", "status": { "does_not_equal": "Resources" } }
        }));
        then.status(200).json_body(json!({
            "results": [{
                "id": "p1",
                "properties": {
                    "Name": { "type": "title", "title": [{ "plain_text": "Engineer" }] },
                    "Company": { "type": "rich_text", "rich_text": [{ "plain_text": "Acme" }] },
                    "Company Description": { "type": "rich_text", "rich_text": [] }
                }
            }],
            "has_more": true,
            "next_cursor": "c2"
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/databases/db1/query")
            .body_contains(r#""start_cursor":"c2""#);
        then.status(200).json_body(json!({
            "results": [{
                "id": "p2",
                "properties": {
                    "Company": { "type": "rich_text", "rich_text": [{ "plain_text": "Globex" }] },
                    "Company Description": {
                        "type": "rich_text",
                        "rich_text": [{ "plain_text": "Makes globes." }]
                    }
                }
            }],
            "has_more": false,
            "next_cursor": null
        }));
    });

    let records = store_for(&server).pending_descriptions().await.unwrap();
    first.assert();
    second.assert();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "p1");
    assert_eq!(records[0].name, "Engineer");
    assert_eq!(records[0].company, "Acme");
    assert!(!records[0].has_description);
    assert_eq!(records[1].company, "Globex");
    assert!(records[1].has_description);
}

#[tokio::test]
async fn set_description_patches_page() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method(PATCH).path("/v1/pages/p1").json_body(json!({
            "properties": {
                "Company Description": {
                    "type": "rich_text",
                    "rich_text": [{ "type": "text", "text": { "content": "Makes anvils." } }]
                }
            }
        }));
        then.status(200).json_body(json!({ "id": "p1" }));
    });

    store_for(&server)
        .set_description("p1", "Makes anvils.")
        .await
        .unwrap();
    patch.assert();
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    // Nothing listens on port 9 (discard) in the test environment.
    let config = NotionConfig::new("t", "db1").with_base_url("http://127.0.0.1:9/v1");
    let store = NotionStore::new(config).unwrap();
    let err = store.files_property_type("Description").await.unwrap_err();
    assert!(matches!(err, ArchiveError::RecordStoreUnavailable { .. }));
}
