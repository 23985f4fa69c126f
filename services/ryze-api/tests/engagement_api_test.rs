//! 资料、会话、抢单、评分与反馈

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_developer_profile_visibility() {
    let app = TestApp::new();
    let (dev_id, developer) = app.signup("dev_p", "developer").await;
    let (_, client) = app.signup("client_p", "client").await;

    let status = app.get("/profile/check-profile", Some(&developer)).await;
    assert_eq!(status.body["has_profile"], false);

    let wrong_kind = app
        .post(
            "/profile/developer",
            Some(&client),
            json!({ "skills": "rust", "experience_years": 3 }),
        )
        .await;
    assert_eq!(wrong_kind.status, StatusCode::FORBIDDEN);

    let created = app
        .post(
            "/profile/developer",
            Some(&developer),
            json!({ "skills": "rust, postgres", "experience_years": 5 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let duplicate = app
        .post(
            "/profile/developer",
            Some(&developer),
            json!({ "skills": "go", "experience_years": 1 }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let public_uri = format!("/profile/developers/{}/public", dev_id);
    assert_eq!(app.get(&public_uri, None).await.status, StatusCode::NOT_FOUND);

    let shown = app
        .patch(
            "/profile/developer/visibility",
            Some(&developer),
            json!({ "is_public": true }),
        )
        .await;
    assert_eq!(shown.status, StatusCode::OK);

    let public = app.get(&public_uri, None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["username"], "dev_p");

    let listing = app.get("/profile/developers/public", None).await;
    assert_eq!(listing.body.as_array().unwrap().len(), 1);

    let status = app.get("/profile/check-profile", Some(&developer)).await;
    assert_eq!(status.body["has_profile"], true);
}

#[tokio::test]
async fn test_conversation_flow() {
    let app = TestApp::new();
    let (_, client) = app.signup("client_q", "client").await;
    let (_, developer) = app.signup("dev_q", "developer").await;
    let (_, outsider) = app.signup("dev_q2", "developer").await;

    let request_id = app
        .create_request(
            &client,
            json!({ "title": "Shop frontend", "content": "Vue storefront", "is_public": true }),
        )
        .await;

    let by_owner = app
        .post(
            "/conversations",
            Some(&client),
            json!({ "request_id": request_id }),
        )
        .await;
    assert_eq!(by_owner.status, StatusCode::BAD_REQUEST);

    let started = app
        .post(
            "/conversations",
            Some(&developer),
            json!({ "request_id": request_id, "initial_message": "I can help", "include_profile": true }),
        )
        .await;
    assert_eq!(started.status, StatusCode::CREATED);
    assert_eq!(started.body["status"], "active");
    assert_eq!(started.body["messages"][0]["content"], "I can help");
    assert_eq!(
        started.body["messages"][0]["linked_content"][0]["type"],
        "profile"
    );
    let conversation_id = started.body["id"].as_str().unwrap().to_string();

    // 同一开发者对同一需求复用会话
    let reused = app
        .post(
            "/conversations",
            Some(&developer),
            json!({ "request_id": request_id, "initial_message": "Hello again" }),
        )
        .await;
    assert_eq!(reused.body["id"], conversation_id.as_str());
    assert_eq!(reused.body["messages"].as_array().unwrap().len(), 1);

    let conversation_uri = format!("/conversations/{}", conversation_id);
    let reply = app
        .post(
            &format!("{}/messages", conversation_uri),
            Some(&client),
            json!({ "content": "What is your rate?" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let hidden = app.get(&conversation_uri, Some(&outsider)).await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let mine = app.get("/conversations/user/list", Some(&client)).await;
    assert_eq!(mine.body.as_array().unwrap().len(), 1);
    assert_eq!(mine.body[0]["request_title"], "Shop frontend");

    let bad_status = app
        .patch(&conversation_uri, Some(&client), json!({ "status": "closed" }))
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let agreed = app
        .patch(
            &conversation_uri,
            Some(&client),
            json!({ "status": "agreed", "agreed_amount": 1500.0 }),
        )
        .await;
    assert_eq!(agreed.status, StatusCode::OK);
    assert_eq!(agreed.body["status"], "agreed");

    let request = app
        .get(&format!("/requests/{}", request_id), Some(&client))
        .await;
    assert_eq!(request.body["status"], "in_progress");
    assert_eq!(request.body["agreed_amount"], 1500.0);
}

#[tokio::test]
async fn test_snag_lifecycle() {
    let app = TestApp::new();
    let (_, client) = app.signup("client_s", "client").await;
    let (_, developer) = app.signup("dev_s", "developer").await;

    let public_id = app
        .create_request(
            &client,
            json!({ "title": "CLI tool", "content": "Parse logs", "is_public": true, "estimated_budget": 800.0 }),
        )
        .await;
    let private_id = app
        .create_request(&client, json!({ "title": "Internal tool", "content": "Reports" }))
        .await;

    let as_client = app
        .post(
            "/snagged-requests",
            Some(&client),
            json!({ "request_id": public_id, "message": "mine" }),
        )
        .await;
    assert_eq!(as_client.status, StatusCode::FORBIDDEN);

    let private = app
        .post(
            "/snagged-requests",
            Some(&developer),
            json!({ "request_id": private_id, "message": "Interested" }),
        )
        .await;
    assert_eq!(private.status, StatusCode::BAD_REQUEST);

    let blank = app
        .post(
            "/snagged-requests",
            Some(&developer),
            json!({ "request_id": public_id, "message": "  " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    let none_opened = app.get("/conversations/user/list", Some(&developer)).await;
    assert!(none_opened.body.as_array().unwrap().is_empty());

    let snagged = app
        .post(
            "/snagged-requests",
            Some(&developer),
            json!({ "request_id": public_id, "message": "Interested" }),
        )
        .await;
    assert_eq!(snagged.status, StatusCode::CREATED);
    let conversation_id = snagged.body["conversation_id"].as_str().unwrap().to_string();

    let twice = app
        .post(
            "/snagged-requests",
            Some(&developer),
            json!({ "request_id": public_id, "message": "Still interested" }),
        )
        .await;
    assert_eq!(twice.status, StatusCode::CONFLICT);

    let listed = app.get("/snagged-requests", Some(&developer)).await;
    assert_eq!(listed.body[0]["request"]["title"], "CLI tool");
    assert_eq!(listed.body[0]["request"]["owner_username"], "client_s");

    let conversation = app
        .get(&format!("/conversations/{}", conversation_id), Some(&client))
        .await;
    assert_eq!(conversation.body["messages"][0]["content"], "Interested");

    let uri = format!("/snagged-requests/{}", public_id);
    assert_eq!(app.delete(&uri, Some(&developer)).await.status, StatusCode::OK);
    assert_eq!(
        app.delete(&uri, Some(&developer)).await.status,
        StatusCode::NOT_FOUND
    );
    let empty = app.get("/snagged-requests", Some(&developer)).await;
    assert!(empty.body.as_array().unwrap().is_empty());

    // 重新抢单复用同一会话
    let again = app
        .post(
            "/snagged-requests",
            Some(&developer),
            json!({ "request_id": public_id, "message": "Back again" }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CREATED);
    assert_eq!(again.body["conversation_id"], conversation_id.as_str());
}

#[tokio::test]
async fn test_ratings_upsert_per_rater() {
    let app = TestApp::new();
    let (dev_id, developer) = app.signup("dev_r", "developer").await;
    let (_, client) = app.signup("client_r", "client").await;
    let (_, other) = app.signup("client_r2", "client").await;
    let rate_uri = format!("/ratings/developer/{}", dev_id);

    let no_profile = app
        .post(&rate_uri, Some(&client), json!({ "stars": 5 }))
        .await;
    assert_eq!(no_profile.status, StatusCode::NOT_FOUND);

    app.post(
        "/profile/developer",
        Some(&developer),
        json!({ "skills": "rust", "experience_years": 2 }),
    )
    .await;

    let own = app
        .post(&rate_uri, Some(&developer), json!({ "stars": 5 }))
        .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);

    let out_of_range = app
        .post(&rate_uri, Some(&client), json!({ "stars": 6 }))
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let first = app
        .post(&rate_uri, Some(&client), json!({ "stars": 2 }))
        .await;
    assert_eq!(first.body["message"], "Rating added successfully");
    let revised = app
        .post(&rate_uri, Some(&client), json!({ "stars": 4, "comment": "Solid" }))
        .await;
    assert_eq!(revised.body["message"], "Rating updated successfully");
    assert_eq!(revised.body["total_ratings"], 1);

    app.post(&rate_uri, Some(&other), json!({ "stars": 5 })).await;

    let summary = app.get(&format!("{}/rating", rate_uri), None).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["total_ratings"], 2);
    assert_eq!(summary.body["average_rating"], 4.5);
    assert_eq!(summary.body["rating_distribution"]["4"], 1);
    assert_eq!(summary.body["rating_distribution"]["1"], 0);

    let mine = app
        .get(&format!("{}/user-rating", rate_uri), Some(&client))
        .await;
    assert_eq!(mine.body["stars"], 4);
}

#[tokio::test]
async fn test_feedback_is_anonymous_but_listing_is_admin_only() {
    let app = TestApp::new();

    let submitted = app
        .post(
            "/feedback",
            None,
            json!({ "rating": 4, "comment": "Nice", "location": "/requests" }),
        )
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED);

    let invalid = app
        .post(
            "/feedback",
            None,
            json!({ "rating": 9, "comment": "Nice", "location": "/requests" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let (_, regular) = app.signup("regular", "client").await;
    let denied = app.get("/feedback", Some(&regular)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    app.signup("boss", "client").await;
    app.users.promote_admin("boss");
    // 角色写在令牌里，提升后需重新登录
    let admin = app.access_token("boss").await;
    let listed = app.get("/feedback", Some(&admin)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}
