use crate::models::{
    CheckinRecord, CheckinSummary, Event, InterestRecord, NewEvent, RelationKey, UserIdentity,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the persistence/auth backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: invalid API key or session")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Documents requested per listing call
const PAGE_SIZE: usize = 100;

/// One page of a document listing
#[derive(Debug)]
struct DocumentPage {
    documents: Vec<Value>,
    last_id: Option<String>,
    total: Option<usize>,
}

impl DocumentPage {
    fn parse(json: &Value) -> Result<Self, BackendError> {
        let raw = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| BackendError::InvalidResponse("Missing documents array".into()))?;

        let last_id = raw
            .last()
            .and_then(|doc| doc.get("$id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let total = json
            .get("total")
            .and_then(Value::as_u64)
            .map(|t| t as usize);
        let documents = raw
            .iter()
            .map(|doc| doc.get("data").unwrap_or(doc).clone())
            .collect();

        Ok(Self {
            documents,
            last_id,
            total,
        })
    }
}

/// Collection IDs in the backend database
#[derive(Debug, Clone)]
pub struct BackendCollections {
    pub events: String,
    pub interests: String,
    pub checkins: String,
}

/// REST client for the external persistence/auth service
///
/// Handles:
/// - Listing and creating events
/// - Creating and deleting interest records
/// - Listing and creating check-in records
/// - Resolving a session token to a user identity
pub struct BackendClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: BackendCollections,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: BackendCollections,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
    }

    /// List every document of a collection, optionally narrowed by query strings
    ///
    /// Pages through the collection with `limit` and `cursorAfter` until the
    /// reported `total` has been collected.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, BackendError> {
        let mut documents = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .list_page(collection, queries, cursor.as_deref())
                .await?;
            let fetched = page.documents.len();
            cursor = page.last_id;
            documents.extend(page.documents);

            let exhausted = match page.total {
                Some(total) => documents.len() >= total,
                None => fetched < PAGE_SIZE,
            };
            if exhausted || fetched == 0 || cursor.is_none() {
                break;
            }
        }

        tracing::debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn list_page(
        &self,
        collection: &str,
        queries: &[String],
        cursor: Option<&str>,
    ) -> Result<DocumentPage, BackendError> {
        let mut page_queries = queries.to_vec();
        page_queries.push(format!("limit({})", PAGE_SIZE));
        if let Some(last_id) = cursor {
            page_queries.push(format!("cursorAfter(\"{}\")", last_id));
        }

        let params: Vec<String> = page_queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect();
        let url = format!("{}?{}", self.documents_url(collection), params.join("&"));

        tracing::debug!("Listing documents from: {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let json = check_status(response, collection).await?.json::<Value>().await?;
        DocumentPage::parse(&json)
    }

    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<(), BackendError> {
        let payload = serde_json::json!({
            "documentId": document_id,
            "data": data,
        });

        let response = self
            .authorized(self.client.post(self.documents_url(collection)))
            .json(&payload)
            .send()
            .await?;

        check_status(response, document_id).await?;
        Ok(())
    }

    /// Fetch every known event
    ///
    /// Documents that fail to parse (e.g. malformed date-time) are skipped.
    pub async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        let documents = self
            .list_documents(&self.collections.events, &["orderAsc(\"dateTime\")".to_string()])
            .await?;
        let total = documents.len();

        let events: Vec<Event> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Event>(doc) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping malformed event document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Listed {} events ({} documents)", events.len(), total);

        Ok(events)
    }

    /// Persist a new event and return it with its assigned identifier
    pub async fn create_event(&self, event: NewEvent) -> Result<Event, BackendError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let data = serde_json::to_value(&event)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to encode event: {}", e)))?;

        self.create_document(&self.collections.events, &id, data).await?;

        tracing::debug!("Created event {} ({})", id, event.title);

        Ok(event.into_event(id))
    }

    /// Every interest record, across all users
    pub async fn list_interests(&self) -> Result<Vec<InterestRecord>, BackendError> {
        let documents = self.list_documents(&self.collections.interests, &[]).await?;
        Ok(documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<InterestRecord>(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed interest document: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn create_interest(&self, key: &RelationKey) -> Result<(), BackendError> {
        let record = InterestRecord {
            user_id: key.user_id.clone(),
            event_id: key.event_id.clone(),
        };
        let data = serde_json::to_value(&record)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to encode interest: {}", e)))?;

        self.create_document(&self.collections.interests, &key.document_id(), data)
            .await?;

        tracing::debug!("Recorded interest: {} -> {}", key.user_id, key.event_id);
        Ok(())
    }

    pub async fn delete_interest(&self, key: &RelationKey) -> Result<(), BackendError> {
        let url = format!(
            "{}/{}",
            self.documents_url(&self.collections.interests),
            key.document_id()
        );

        let response = self.authorized(self.client.delete(&url)).send().await?;
        check_status(response, &key.document_id()).await?;

        tracing::debug!("Removed interest: {} -> {}", key.user_id, key.event_id);
        Ok(())
    }

    /// Check-in records of one user
    pub async fn list_checkins(&self, user_id: &str) -> Result<Vec<CheckinRecord>, BackendError> {
        let query = format!("equal(\"userId\", [\"{}\"])", user_id);
        let documents = self
            .list_documents(&self.collections.checkins, &[query])
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<CheckinRecord>(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed check-in document: {}", e);
                    None
                }
            })
            .filter(|record| record.user_id == user_id)
            .collect())
    }

    pub async fn create_checkin(&self, key: &RelationKey) -> Result<CheckinRecord, BackendError> {
        let record = CheckinRecord {
            user_id: key.user_id.clone(),
            event_id: key.event_id.clone(),
            checked_in_at: chrono::Utc::now(),
        };
        let data = serde_json::to_value(&record)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to encode check-in: {}", e)))?;

        self.create_document(&self.collections.checkins, &key.document_id(), data)
            .await?;

        tracing::debug!("Recorded check-in: {} -> {}", key.user_id, key.event_id);
        Ok(record)
    }

    /// A user's check-ins joined with their events, newest first
    ///
    /// Check-ins whose event no longer resolves are left out.
    pub async fn checkin_history(&self, user_id: &str) -> Result<Vec<CheckinSummary>, BackendError> {
        let checkins = self.list_checkins(user_id).await?;
        let events: HashMap<String, Event> = self
            .list_events()
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        Ok(join_checkins(checkins, &events))
    }

    /// Resolve a session JWT to the signed-in user
    pub async fn get_account(&self, jwt: &str) -> Result<UserIdentity, BackendError> {
        let url = format!("{}/account", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-JWT", jwt)
            .send()
            .await?;

        let json: Value = check_status(response, "account").await?.json().await?;
        parse_account(&json)
    }

    /// Health check for the backend connection
    pub async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

async fn check_status(
    response: reqwest::Response,
    subject: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::Unauthorized),
        StatusCode::NOT_FOUND => Err(BackendError::NotFound(subject.to_string())),
        StatusCode::CONFLICT => Err(BackendError::Conflict(subject.to_string())),
        _ => {
            tracing::error!("Backend request for {} failed: {} - {}", subject, status, body);
            Err(BackendError::ApiError(format!("{} ({})", status, subject)))
        }
    }
}

fn parse_account(json: &Value) -> Result<UserIdentity, BackendError> {
    let field = |name: &str| json.get(name).and_then(|v| v.as_str()).map(str::to_string);

    let user_id = field("$id")
        .ok_or_else(|| BackendError::InvalidResponse("Account is missing $id".into()))?;

    Ok(UserIdentity {
        user_id,
        display_name: field("name").unwrap_or_default(),
        email: field("email").unwrap_or_default(),
        avatar_url: json
            .get("prefs")
            .and_then(|p| p.get("avatarUrl"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

fn join_checkins(
    mut checkins: Vec<CheckinRecord>,
    events: &HashMap<String, Event>,
) -> Vec<CheckinSummary> {
    checkins.sort_by(|a, b| b.checked_in_at.cmp(&a.checked_in_at));
    checkins
        .into_iter()
        .filter_map(|record| {
            let event = events.get(&record.event_id)?;
            Some(CheckinSummary {
                event_id: record.event_id,
                title: event.title.clone(),
                location_name: event.location_name.clone(),
                date_time: event.date_time,
                checked_in_at: record.checked_in_at,
            })
        })
        .collect()
}
