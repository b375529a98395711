mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use common::{
    create_entry, get, login_token, multipart_request, send, test_app, test_app_with_media,
    MEDIA_BASE,
};
use journal_api::services::media::FailingMediaHost;

#[tokio::test]
async fn create_requires_a_title() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "POST",
            "/api/v1/journal",
            Some(&token),
            &[("title", "   "), ("content", "text")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn created_entries_show_up_in_own_listing() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;

    let id = create_entry(&app, &token, "day one", "dear diary").await;

    let (status, body) = send(&app.router, get("/api/v1/journal", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], id.as_str());
    assert_eq!(entries[0]["title"], "day one");
    assert_eq!(entries[0]["content"], "dear diary");
}

#[tokio::test]
async fn own_listing_only_contains_own_entries() {
    let app = test_app();
    let alice = login_token(&app, "alice", "pw").await;
    let bob = login_token(&app, "bob", "pw").await;

    create_entry(&app, &alice, "alice's entry", "...").await;

    let (_, bob_list) = send(&app.router, get("/api/v1/journal", Some(&bob))).await;
    assert_eq!(bob_list["data"].as_array().unwrap().len(), 0);

    // The shared listing sees everything.
    let (_, all) = send(&app.router, get("/api/v1/journal/all", Some(&bob))).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_by_id_and_missing_id() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;
    let id = create_entry(&app, &token, "day one", "text").await;

    let (status, body) = send(
        &app.router,
        get(&format!("/api/v1/journal/id/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "day one");

    let (status, body) = send(
        &app.router,
        get(
            "/api/v1/journal/id/00000000-0000-0000-0000-000000000000",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn update_applies_only_provided_fields() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;
    let id = create_entry(&app, &token, "original title", "original content").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "PUT",
            &format!("/api/v1/journal/id/{}", id),
            Some(&token),
            &[("title", "new title")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "new title");
    assert_eq!(body["data"]["content"], "original content");
}

#[tokio::test]
async fn mutating_someone_elses_entry_is_forbidden_not_missing() {
    let app = test_app();
    let alice = login_token(&app, "alice", "pw").await;
    let bob = login_token(&app, "bob", "pw").await;
    let id = create_entry(&app, &alice, "alice's entry", "...").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "PUT",
            &format!("/api/v1/journal/id/{}", id),
            Some(&bob),
            &[("title", "hijacked")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(
        &app.router,
        json_delete(&format!("/api/v1/journal/id/{}", id), &bob),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // The entry is untouched.
    let (_, body) = send(&app.router, get(&format!("/api/v1/journal/id/{}", id), Some(&alice))).await;
    assert_eq!(body["data"]["title"], "alice's entry");
}

#[tokio::test]
async fn deleting_missing_entry_is_not_found_not_forbidden() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;

    let (status, body) = send(
        &app.router,
        json_delete("/api/v1/journal/id/00000000-0000-0000-0000-000000000000", &token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn owner_can_delete_and_ownership_set_shrinks() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;
    let id = create_entry(&app, &token, "to be removed", "...").await;

    let (status, _) = send(
        &app.router,
        json_delete(&format!("/api/v1/journal/id/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        get(&format!("/api/v1/journal/id/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app.router, get("/api/v1/journal", Some(&token))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, profile) = send(&app.router, get("/api/v1/user", Some(&token))).await;
    assert_eq!(profile["data"]["journal_ids"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn attached_image_is_hosted_and_linked() {
    let app = test_app();
    let token = login_token(&app, "alice", "pw").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "POST",
            "/api/v1/journal",
            Some(&token),
            &[("title", "with picture"), ("content", "...")],
            Some(("image", "sunset.png", b"fake-png-bytes")),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["data"]["image_url"],
        format!("{}/sunset.png", MEDIA_BASE)
    );
}

#[tokio::test]
async fn media_host_failure_leaves_no_partial_entry() {
    let app = test_app_with_media(Arc::new(FailingMediaHost));
    let token = login_token(&app, "alice", "pw").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "POST",
            "/api/v1/journal",
            Some(&token),
            &[("title", "doomed"), ("content", "...")],
            Some(("image", "sunset.png", b"fake-png-bytes")),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "BAD_GATEWAY");

    // Nothing was created and the caller is still perfectly authenticated.
    let (status, body) = send(&app.router, get("/api/v1/journal", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

fn json_delete(uri: &str, token: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token),
        )
        .body(axum::body::Body::empty())
        .unwrap()
}
