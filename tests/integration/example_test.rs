//! Integration tests for the Example-specific and health routes.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_search_filters_by_name_and_description() {
    let app = TestApp::new().await;
    app.create_example("North Pump", "Primary intake").await;
    app.create_example("South pump", "Backup intake").await;
    app.create_example("Valve", "Primary outlet").await;

    let by_name = app.request("GET", "/example/search?Name=PUMP", None).await;
    assert_eq!(by_name.status, StatusCode::OK);
    assert_eq!(by_name.body["totalCount"], 2);

    let both = app
        .request(
            "GET",
            "/example/search?Name=pump&Description=primary&SortBy=Name&Direction=asc",
            None,
        )
        .await;
    assert_eq!(both.body["totalCount"], 1);
    assert_eq!(both.body["data"][0]["name"], "North Pump");
}

#[tokio::test]
async fn test_search_without_terms_lists_active_rows() {
    let app = TestApp::new().await;
    let a = app.create_example("A", "x").await;
    app.create_example("B", "y").await;
    app.request("DELETE", &format!("/example/{a}"), None).await;

    let response = app.request("GET", "/example/search", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalCount"], 1);
    assert_eq!(response.body["data"][0]["name"], "B");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "memory");
}
