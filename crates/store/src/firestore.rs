//! Firestore REST backend.
//!
//! Users and requests live in two collections. Pending requests are fetched
//! with a `runQuery` on `status == "pending"`; updates are `PATCH`es with an
//! update mask on `returnedUsers` and `status` that fail if the document no
//! longer exists. Typed Firestore values are flattened into plain JSON and
//! then decoded with the same lenient rules as every other backend.

use crate::change::ChangeSubscription;
use crate::error::{Result, StoreError};
use crate::poller::spawn_request_poller;
use crate::DocumentStore;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use skillmatch_matching::{RequestRecord, RequestUpdate, UserRecord};
use std::sync::Arc;
use std::time::Duration;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const USER_AGENT: &str = concat!("skillmatch-store/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`FirestoreStore`].
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    /// API origin, overridable for emulators and tests.
    pub base_url: String,
    /// Bearer token sent as-is; obtaining it is the caller's concern.
    pub token: Option<String>,
    pub users_collection: String,
    pub requests_collection: String,
    pub page_size: u32,
    pub poll_interval: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            base_url: FIRESTORE_BASE_URL.to_string(),
            token: None,
            users_collection: "users".to_string(),
            requests_collection: "requests".to_string(),
            page_size: 300,
            poll_interval: Duration::from_secs(2),
        }
    }

    /// `projects/{p}/databases/{db}/documents`
    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.documents_path()
        )
    }
}

#[derive(Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

/// Store backed by the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    config: Arc<FirestoreConfig>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: FirestoreConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let builder = builder.header("User-Agent", USER_AGENT);
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Fetch every document of a collection, following page tokens.
    async fn list_collection<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.config.documents_url(), collection);
        let page_size = self.config.page_size.to_string();
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let response = self
                .apply_auth(self.client.get(&url).query(&query))
                .send()
                .await?;
            let page: ListDocumentsResponse = check_status(response).await?.json().await?;

            for document in page.documents {
                records.push(decode_document(document)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    tracing::warn!(
                        target: "skillmatch::store",
                        collection,
                        page_token = %next,
                        "Firestore repeated a page token; stopping pagination"
                    );
                    break;
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            target: "skillmatch::store",
            collection,
            documents = records.len(),
            "Listed Firestore collection"
        );
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.list_collection(&self.config.users_collection).await
    }

    async fn list_requests(&self) -> Result<Vec<RequestRecord>> {
        self.list_collection(&self.config.requests_collection).await
    }

    async fn list_pending_requests(&self) -> Result<Vec<RequestRecord>> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.config.requests_collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "status" },
                        "op": "EQUAL",
                        "value": { "stringValue": "pending" }
                    }
                }
            }
        });
        let url = format!("{}:runQuery", self.config.documents_url());
        let response = self
            .apply_auth(self.client.post(&url).json(&body))
            .send()
            .await?;
        let items: Vec<RunQueryItem> = check_status(response).await?.json().await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(decode_document::<RequestRecord>)
            .collect()
    }

    async fn update_request(&self, id: &str, update: &RequestUpdate) -> Result<()> {
        let name = format!(
            "{}/{}/{}",
            self.config.documents_path(),
            self.config.requests_collection,
            id
        );
        let url = format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), name);
        let body = json!({
            "fields": {
                "returnedUsers": string_array(&update.returned_users),
                "status": { "stringValue": update.status.as_str() }
            }
        });
        let response = self
            .apply_auth(
                self.client
                    .patch(&url)
                    .query(&[
                        ("updateMask.fieldPaths", "returnedUsers"),
                        ("updateMask.fieldPaths", "status"),
                        ("currentDocument.exists", "true"),
                    ])
                    .json(&body),
            )
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        check_status(response).await?;
        Ok(())
    }

    async fn subscribe_request_changes(&self) -> Result<ChangeSubscription> {
        Ok(spawn_request_poller(self.clone(), self.config.poll_interval))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a document into a record, taking its id from the document name.
fn decode_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    let id = document
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let mut plain = fields_to_plain(&document.fields);
    plain.insert("id".to_string(), Value::String(id));
    serde_json::from_value(Value::Object(plain)).map_err(|err| StoreError::Decode {
        name: document.name,
        message: err.to_string(),
    })
}

fn fields_to_plain(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), to_plain(value)))
        .collect()
}

/// Flatten one typed Firestore value (`{"stringValue": "x"}`) into plain JSON.
fn to_plain(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "booleanValue" | "doubleValue" | "timestampValue" | "referenceValue"
        | "bytesValue" => inner.clone(),
        // Integers travel as strings.
        "integerValue" => inner
            .as_str()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(to_plain).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(fields_to_plain)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

fn string_array(values: &[String]) -> Value {
    let values: Vec<Value> = values
        .iter()
        .map(|v| json!({ "stringValue": v }))
        .collect();
    json!({ "arrayValue": { "values": values } })
}
