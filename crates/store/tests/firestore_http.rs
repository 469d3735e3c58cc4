//! HTTP behaviour of the Firestore backend against a mock server.

use serde_json::json;
use skillmatch_matching::{RequestStatus, RequestUpdate};
use skillmatch_store::{DocumentStore, FirestoreConfig, FirestoreStore, StoreError};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

fn store_for(server: &MockServer, token: Option<&str>) -> FirestoreStore {
    let mut config = FirestoreConfig::new("demo");
    config.base_url = server.uri();
    config.token = token.map(str::to_string);
    config.page_size = 2;
    FirestoreStore::new(config)
}

fn user_doc(id: &str, skills: &[(&str, &str)]) -> serde_json::Value {
    let values: Vec<_> = skills
        .iter()
        .map(|(name, level)| {
            json!({ "mapValue": { "fields": {
                "name": { "stringValue": name },
                "level": { "stringValue": level }
            } } })
        })
        .collect();
    json!({
        "name": format!("projects/demo/databases/(default)/documents/users/{id}"),
        "fields": { "skills": { "arrayValue": { "values": values } } }
    })
}

#[tokio::test]
async fn list_users_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users")))
        .and(query_param("pageToken", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [user_doc("u3", &[])]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users")))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                user_doc("u1", &[("Python", "Expert")]),
                user_doc("u2", &[("SQL", "Intermediate")])
            ],
            "nextPageToken": "next-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = store_for(&server, None).list_users().await.unwrap();

    let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
    assert_eq!(users[0].skills[0].name, "Python");
    assert_eq!(users[0].skills[0].level, "Expert");
    assert!(users[2].skills.is_empty());
}

#[tokio::test]
async fn given_repeated_page_token_when_listing_then_pagination_stops() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users")))
        .and(query_param("pageToken", "stuck"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [user_doc("u3", &[])],
            "nextPageToken": "stuck"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [user_doc("u1", &[]), user_doc("u2", &[])],
            "nextPageToken": "stuck"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = store_for(&server, None).list_users().await.unwrap();

    let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn empty_collection_lists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/requests")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let requests = store_for(&server, None).list_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn pending_requests_use_status_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "requests" }],
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "status" },
                    "op": "EQUAL",
                    "value": { "stringValue": "pending" }
                } }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/demo/databases/(default)/documents/requests/r1",
                    "fields": {
                        "status": { "stringValue": "pending" },
                        "userId": { "stringValue": "u3" },
                        "skillRequired": { "arrayValue": { "values": [{ "stringValue": "python" }] } },
                        "skillLevelRequired": { "arrayValue": { "values": [{ "stringValue": "expert" }] } }
                    }
                },
                "readTime": "2026-01-01T00:00:00Z"
            },
            { "readTime": "2026-01-01T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let pending = store_for(&server, None)
        .list_pending_requests()
        .await
        .unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "r1");
    assert_eq!(pending[0].status, RequestStatus::Pending);
    assert_eq!(pending[0].skill_required, vec!["python"]);
    assert_eq!(pending[0].skill_level_required, vec!["expert"]);
}

#[tokio::test]
async fn update_patches_masked_fields_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/requests/r1")))
        .and(query_param("currentDocument.exists", "true"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "fields": {
                "returnedUsers": { "arrayValue": { "values": [
                    { "stringValue": "u2" }, { "stringValue": "u1" }
                ] } },
                "status": { "stringValue": "processed" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/requests/r1",
            "fields": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server, Some("secret-token"))
        .update_request("r1", &RequestUpdate::processed(vec!["u2".into(), "u1".into()]))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_of_missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/requests/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = store_for(&server, None)
        .update_request("gone", &RequestUpdate::no_match())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "gone"));
}

#[tokio::test]
async fn server_errors_surface_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users")))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = store_for(&server, None).list_users().await.unwrap_err();
    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "permission denied");
        }
        other => panic!("unexpected error: {other}"),
    }
}
