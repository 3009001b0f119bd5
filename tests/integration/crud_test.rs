//! Integration tests for the generic CRUD routes.

mod helpers;

use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_create_list_activate_flow() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/example", Some(json!({ "Name": "A", "Description": "B" })))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_i64().unwrap();

    let list = app.request("GET", "/example", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["totalCount"], 1);
    assert_eq!(list.body["data"][0]["name"], "A");

    let response = app.request("PATCH", &format!("/example/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_type(), "ValidationFailure");
    assert_eq!(response.message(), "Record is already active.");
    assert_eq!(response.body["isCustomException"], false);
}

#[tokio::test]
async fn test_verb_status_codes() {
    let app = TestApp::new().await;
    let id = app.create_example("A", "B").await;

    let get = app.request("GET", &format!("/example/{id}"), None).await;
    assert_eq!(get.status, StatusCode::OK);

    let put = app
        .request(
            "PUT",
            "/example",
            Some(json!({ "Id": id, "Name": "A2", "Description": "B2" })),
        )
        .await;
    assert_eq!(put.status, StatusCode::OK);
    assert_eq!(put.body["name"], "A2");

    let delete = app.request("DELETE", &format!("/example/{id}"), None).await;
    assert_eq!(delete.status, StatusCode::OK);

    let patch = app.request("PATCH", &format!("/example/{id}"), None).await;
    assert_eq!(patch.status, StatusCode::OK);
    assert!(patch.body["deletedAt"].is_null());
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let app = TestApp::new().await;
    let id = app.create_example("A", "B").await;

    let first = app.request("DELETE", &format!("/example/{id}"), None).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.request("DELETE", &format!("/example/{id}"), None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(second.error_type(), "ValidationFailure");
    assert_eq!(second.message(), "Record is already inactive.");
}

#[tokio::test]
async fn test_deleted_rows_leave_the_listing_but_stay_readable() {
    let app = TestApp::new().await;
    let kept = app.create_example("Kept", "x").await;
    let gone = app.create_example("Gone", "y").await;
    app.request("DELETE", &format!("/example/{gone}"), None).await;

    let list = app.request("GET", "/example", None).await;
    assert_eq!(list.body["totalCount"], 1);
    assert_eq!(list.body["data"][0]["id"], kept);

    let get = app.request("GET", &format!("/example/{gone}"), None).await;
    assert_eq!(get.status, StatusCode::OK);
    assert!(get.body["deletedAt"].is_string());
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app = TestApp::new().await;

    for (method, path, body) in [
        ("GET", "/example/99", None),
        ("DELETE", "/example/99", None),
        ("PATCH", "/example/99", None),
        (
            "PUT",
            "/example",
            Some(json!({ "Id": 99, "Name": "A", "Description": "B" })),
        ),
    ] {
        let response = app.request(method, path, body).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {path}");
        assert_eq!(response.error_type(), "NotFound");
        assert_eq!(response.message(), "Example not found");
    }
}

#[tokio::test]
async fn test_invalid_payload_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/example", Some(json!({ "Name": "", "Description": "B" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_type(), "ValidationFailure");
    assert_eq!(response.body["isCustomException"], true);
    assert_eq!(response.message(), "Name is required");

    let response = app.request("GET", "/example/abc", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_sort_field_is_invalid_operation() {
    let app = TestApp::new().await;
    app.create_example("A", "B").await;

    let response = app.request("GET", "/example?SortBy=Color", None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_type(), "InvalidOperation");
    assert_eq!(response.body["isCustomException"], true);
}

#[tokio::test]
async fn test_pagination_and_ordering() {
    let app = TestApp::new().await;
    for i in 1..=25 {
        app.create_example(&format!("Example {i:02}"), "seeded").await;
    }

    let first = app
        .request("GET", "/example?PageNumber=0&PageSize=10", None)
        .await;
    assert_eq!(first.body["data"].as_array().unwrap().len(), 10);
    assert_eq!(first.body["totalPages"], 3);
    assert_eq!(first.body["data"][0]["id"], 25);

    let last = app
        .request("GET", "/example?PageNumber=2&PageSize=10", None)
        .await;
    assert_eq!(last.body["data"].as_array().unwrap().len(), 5);

    let clamped = app
        .request("GET", "/example?PageNumber=-5&PageSize=1000", None)
        .await;
    assert_eq!(clamped.body["currentPage"], 0);
    assert_eq!(clamped.body["pageSize"], 50);
    assert_eq!(clamped.body["data"].as_array().unwrap().len(), 25);

    let ascending = app
        .request("GET", "/example?SortBy=Id&Direction=asc&PageSize=3", None)
        .await;
    let ids: Vec<i64> = ascending.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_update_stamps_updated_at() {
    let app = TestApp::new().await;
    let id = app.create_example("A", "B").await;

    let created = app.request("GET", &format!("/example/{id}"), None).await;
    assert_eq!(created.body["createdAt"], created.body["updatedAt"]);

    app.clock.advance(Duration::hours(1));
    let updated = app
        .request(
            "PUT",
            "/example",
            Some(json!({ "Id": id, "Name": "A", "Description": "C" })),
        )
        .await;
    assert_eq!(updated.body["createdAt"], created.body["createdAt"]);
    assert_eq!(updated.body["updatedAt"], "2024-06-01T09:00:00");
}
