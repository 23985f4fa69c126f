//! 需求、共享、项目与评论

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{Value, json};

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_sensitive_request_cannot_be_public() {
    let app = TestApp::new();
    let (_, client) = app.signup("client_a", "client").await;

    let rejected = app
        .post(
            "/requests",
            Some(&client),
            json!({
                "title": "Rotate the API key",
                "content": "Our api_key leaked",
                "is_public": true,
            }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let created = app
        .post(
            "/requests",
            Some(&client),
            json!({ "title": "Rotate the API key", "content": "Our api_key leaked" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["contains_sensitive_data"], true);
    assert_eq!(created.body["is_public"], false);
    assert_eq!(created.body["status"], "open");

    let id = created.body["id"].as_str().unwrap();
    let privacy = app
        .put(
            &format!("/requests/{}/privacy", id),
            Some(&client),
            json!({ "is_public": true }),
        )
        .await;
    assert_eq!(privacy.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visibility_rules() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner_b", "client").await;
    let (_, stranger) = app.signup("stranger_b", "developer").await;

    let private_id = app
        .create_request(&owner, json!({ "title": "Private work", "content": "Details" }))
        .await;
    let public_id = app
        .create_request(
            &owner,
            json!({ "title": "Landing page", "content": "Marketing site", "is_public": true }),
        )
        .await;

    let forbidden = app
        .get(&format!("/requests/{}", private_id), Some(&stranger))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let visible = app
        .get(&format!("/requests/{}", public_id), Some(&stranger))
        .await;
    assert_eq!(visible.status, StatusCode::OK);
    assert_eq!(visible.body["owner_username"], "owner_b");

    let public = app.get("/requests/public", None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(ids(&public.body), vec![public_id.clone()]);

    let missing = app
        .get(&format!("/requests/{}", ryze_common::RequestId::new()), Some(&owner))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let edit = app
        .put(
            &format!("/requests/{}", public_id),
            Some(&stranger),
            json!({ "title": "Hijacked" }),
        )
        .await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_share_lifecycle() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner_c", "client").await;
    let (dev_id, developer) = app.signup("dev_c", "developer").await;

    let id = app
        .create_request(&owner, json!({ "title": "Mobile app", "content": "iOS and Android" }))
        .await;

    let shared = app
        .post(
            &format!("/requests/{}/share", id),
            Some(&owner),
            json!({ "shared_with_user_id": dev_id, "can_edit": true }),
        )
        .await;
    assert_eq!(shared.status, StatusCode::CREATED);
    assert_eq!(shared.body["username"], "dev_c");

    let again = app
        .post(
            &format!("/requests/{}/share", id),
            Some(&owner),
            json!({ "shared_with_user_id": dev_id }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let inbox = app.get("/requests/shared-with-me", Some(&developer)).await;
    assert_eq!(ids(&inbox.body), vec![id.clone()]);

    let combined = app.get("/requests", Some(&developer)).await;
    assert_eq!(ids(&combined.body), vec![id.clone()]);
    let own_only = app
        .get("/requests?include_shared=false", Some(&developer))
        .await;
    assert!(ids(&own_only.body).is_empty());

    // 可编辑的共享者能修改内容，但不能改可见性
    let edit = app
        .put(
            &format!("/requests/{}", id),
            Some(&developer),
            json!({ "content": "iOS only" }),
        )
        .await;
    assert_eq!(edit.status, StatusCode::OK);
    assert_eq!(edit.body["content"], "iOS only");
    let visibility = app
        .put(
            &format!("/requests/{}", id),
            Some(&developer),
            json!({ "is_public": true }),
        )
        .await;
    assert_eq!(visibility.status, StatusCode::FORBIDDEN);

    let shares = app
        .get(&format!("/requests/{}/shares", id), Some(&owner))
        .await;
    assert_eq!(shares.body.as_array().unwrap().len(), 1);
    let not_owner = app
        .get(&format!("/requests/{}/shares", id), Some(&developer))
        .await;
    assert_eq!(not_owner.status, StatusCode::FORBIDDEN);

    let removed = app
        .delete(&format!("/requests/{}/share/{}", id, dev_id), Some(&owner))
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    let removed_again = app
        .delete(&format!("/requests/{}/share/{}", id, dev_id), Some(&owner))
        .await;
    assert_eq!(removed_again.status, StatusCode::NOT_FOUND);

    let after = app.get(&format!("/requests/{}", id), Some(&developer)).await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_with_developer_shares_automatically() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner_d", "client").await;
    let (dev_id, developer) = app.signup("dev_d", "developer").await;

    let created = app
        .post(
            "/requests",
            Some(&owner),
            json!({ "title": "Data pipeline", "content": "ETL jobs", "developer_id": dev_id }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["shared_with"][0]["username"], "dev_d");

    let id = created.body["id"].as_str().unwrap();
    let viewed = app.get(&format!("/requests/{}", id), Some(&developer)).await;
    assert_eq!(viewed.status, StatusCode::OK);

    let sensitive = app
        .post(
            "/requests",
            Some(&owner),
            json!({ "title": "Reset password flow", "content": "Email links", "developer_id": dev_id }),
        )
        .await;
    assert_eq!(sensitive.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_transitions() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner_e", "client").await;
    let id = app
        .create_request(&owner, json!({ "title": "Dashboard", "content": "Charts" }))
        .await;
    let uri = format!("/requests/{}", id);

    let invalid = app
        .put(&uri, Some(&owner), json!({ "status": "completed" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let started = app
        .put(&uri, Some(&owner), json!({ "status": "in_progress" }))
        .await;
    assert_eq!(started.body["status"], "in_progress");

    let done = app
        .put(&uri, Some(&owner), json!({ "status": "completed" }))
        .await;
    assert_eq!(done.body["status"], "completed");

    let deleted = app.delete(&uri, Some(&owner)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&owner)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_projects_group_requests() {
    let app = TestApp::new();
    let (_, client) = app.signup("client_f", "client").await;
    let (_, developer) = app.signup("dev_f", "developer").await;

    let denied = app
        .post("/projects", Some(&developer), json!({ "name": "Side project" }))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let project = app
        .post(
            "/projects",
            Some(&client),
            json!({ "name": "Website relaunch", "description": "Q3" }),
        )
        .await;
    assert_eq!(project.status, StatusCode::CREATED);
    let project_id = project.body["id"].as_str().unwrap().to_string();

    let request_id = app
        .create_request(
            &client,
            json!({ "title": "Homepage", "content": "Hero section", "project_id": project_id }),
        )
        .await;
    let loose_id = app
        .create_request(&client, json!({ "title": "Blog", "content": "Posts" }))
        .await;

    let filtered = app
        .get(&format!("/requests?project_id={}", project_id), Some(&client))
        .await;
    assert_eq!(ids(&filtered.body), vec![request_id.clone()]);

    let attached = app
        .put(
            &format!("/requests/{}/project", loose_id),
            Some(&client),
            json!({ "project_id": project_id }),
        )
        .await;
    assert_eq!(attached.status, StatusCode::OK);
    assert_eq!(attached.body["project_id"], project_id.as_str());

    let listed = app.get("/projects", Some(&client)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body[0]["request_stats"]["total"], 2);

    let blocked = app
        .delete(&format!("/projects/{}", project_id), Some(&client))
        .await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);

    for id in [&request_id, &loose_id] {
        let detached = app
            .delete(&format!("/requests/{}/project", id), Some(&client))
            .await;
        assert_eq!(detached.body["project_id"], Value::Null);
    }

    let deleted = app
        .delete(&format!("/projects/{}", project_id), Some(&client))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Project deleted successfully");
}

#[tokio::test]
async fn test_user_search() {
    let app = TestApp::new();
    let (_, searcher) = app.signup("searcher", "client").await;
    app.register("target_one", "developer").await;
    app.register("target_two", "developer").await;

    let short = app
        .get("/requests/search/users?q=t", Some(&searcher))
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let found = app
        .get("/requests/search/users?q=TARGET", Some(&searcher))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_comment_threads_and_votes() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner_g", "client").await;
    let (_, developer) = app.signup("dev_g", "developer").await;

    let id = app
        .create_request(
            &owner,
            json!({ "title": "Chat widget", "content": "Embed support", "is_public": true }),
        )
        .await;
    let comments_uri = format!("/requests/{}/comments", id);

    let top = app
        .post(&comments_uri, Some(&developer), json!({ "content": "Which stack?" }))
        .await;
    assert_eq!(top.status, StatusCode::CREATED);
    let top_id = top.body["id"].as_str().unwrap().to_string();

    let reply = app
        .post(
            &comments_uri,
            Some(&owner),
            json!({ "content": "React", "parent_id": top_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let up = app
        .post(
            &format!("/comments/{}/vote", top_id),
            Some(&owner),
            json!({ "vote_type": 1 }),
        )
        .await;
    assert_eq!(up.body["vote_count"], 1);
    let down = app
        .post(
            &format!("/comments/{}/vote", top_id),
            Some(&developer),
            json!({ "vote_type": -1 }),
        )
        .await;
    assert_eq!(down.body["vote_count"], 0);
    let bad = app
        .post(
            &format!("/comments/{}/vote", top_id),
            Some(&owner),
            json!({ "vote_type": 2 }),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    // 匿名用户可以读取公开需求的评论
    let anonymous = app.get(&comments_uri, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    let tree = anonymous.body.as_array().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["replies"][0]["content"], "React");

    let viewer = app.get(&comments_uri, Some(&owner)).await;
    assert_eq!(viewer.body[0]["user_vote"], 1);

    let not_author = app
        .delete(&format!("/comments/{}", top_id), Some(&owner))
        .await;
    assert_eq!(not_author.status, StatusCode::FORBIDDEN);
    let removed = app
        .delete(&format!("/comments/{}", top_id), Some(&developer))
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let after = app.get(&comments_uri, None).await;
    assert!(after.body.as_array().unwrap().is_empty());
}
