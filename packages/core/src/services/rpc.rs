//! RPC-backed persistence
//!
//! Maps each [`PersistenceBackend`] call onto a remote method. Requests carry
//! the anti-forgery token in the `X-Frappe-CSRF-Token` header; responses come
//! back in an envelope whose `message` holds the payload and whose
//! `exc`/`exc_type` fields flag a remote failure. The envelope is checked
//! before the payload is trusted, and a reported failure is returned with the
//! original exception text. Nothing is retried.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::Item;
use crate::services::backend::{
    CollectionRecord, CollectionUpsert, Page, PageRef, PageSummary, PageUpdate, PersistenceBackend,
};
use crate::services::ServiceError;

/// Header carrying the anti-forgery token
pub const CSRF_HEADER: &str = "X-Frappe-CSRF-Token";

const PAGE_METHODS: &str = "/api/method/workbench.api";
const COLLECTION_METHODS: &str = "/api/method/workbench.workbench.inline_api.inline_collection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One outgoing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    /// JSON body for POST, query parameters for GET
    pub params: Value,
}

impl RpcRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Sends requests and returns the decoded response body
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, request: RpcRequest) -> Result<Value, ServiceError>;
}

/// Response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub message: Option<Value>,

    #[serde(default)]
    pub exc: Option<Value>,

    #[serde(default)]
    pub exc_type: Option<String>,
}

impl ApiEnvelope {
    /// Payload of a response body, or the remote error it reports
    ///
    /// Bodies without a `message` field are their own payload.
    pub fn open(body: Value) -> Result<Value, ServiceError> {
        let envelope: ApiEnvelope = serde_json::from_value(body.clone()).unwrap_or_default();

        if envelope.exc_type.is_some() || envelope.exc.as_ref().is_some_and(|exc| !exc.is_null()) {
            let message = match envelope.exc {
                Some(Value::String(text)) => text,
                Some(Value::Null) | None => "API Error".to_string(),
                Some(other) => other.to_string(),
            };
            return Err(ServiceError::remote(
                envelope.exc_type.unwrap_or_else(|| "Error".to_string()),
                message,
            ));
        }

        Ok(match envelope.message {
            Some(message) => message,
            None if body.get("message").is_some() => Value::Null,
            None => body,
        })
    }
}

/// Response flagged with `success`
#[derive(Debug, Deserialize)]
struct Flagged<T> {
    #[serde(default = "default_success")]
    success: bool,

    #[serde(flatten)]
    payload: T,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct ItemsPayload {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemPayload {
    item: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct Empty {}

/// [`PersistenceBackend`] over an [`RpcTransport`]
pub struct RpcBackend<T: RpcTransport> {
    transport: T,
    csrf_token: String,
}

impl<T: RpcTransport> RpcBackend<T> {
    pub fn new(transport: T, csrf_token: impl Into<String>) -> Self {
        Self {
            transport,
            csrf_token: csrf_token.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, method: HttpMethod, path: String, params: Value) -> RpcRequest {
        RpcRequest {
            method,
            path,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (CSRF_HEADER.to_string(), self.csrf_token.clone()),
            ],
            params,
        }
    }

    async fn call<R: DeserializeOwned>(&self, method: HttpMethod, path: String, params: Value) -> Result<R, ServiceError> {
        tracing::debug!("RPC {:?} {}", method, path);
        let body = self
            .transport
            .send(self.request(method, path.clone(), params))
            .await
            .inspect_err(|e| tracing::warn!("RPC {} failed: {}", path, e))?;
        let payload = ApiEnvelope::open(body).inspect_err(|e| tracing::warn!("RPC {} returned error: {}", path, e))?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn call_flagged<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Value,
    ) -> Result<R, ServiceError> {
        let response: Flagged<R> = self
            .call(method, format!("{}.{}", COLLECTION_METHODS, endpoint), params)
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(endpoint));
        }
        Ok(response.payload)
    }
}

#[async_trait]
impl<T: RpcTransport> PersistenceBackend for RpcBackend<T> {
    async fn list_pages(&self, search: &str) -> Result<Vec<PageSummary>, ServiceError> {
        let pages: Option<Vec<PageSummary>> = self
            .call(
                HttpMethod::Get,
                format!("{}.list_pages", PAGE_METHODS),
                json!({ "search": search }),
            )
            .await?;
        Ok(pages.unwrap_or_default())
    }

    async fn get_page(&self, name: &str) -> Result<Page, ServiceError> {
        let page: Option<Page> = self
            .call(HttpMethod::Get, format!("{}.get_page", PAGE_METHODS), json!({ "name": name }))
            .await?;
        page.ok_or_else(|| ServiceError::not_found(format!("page {}", name)))
    }

    async fn create_page(&self, title: &str) -> Result<PageRef, ServiceError> {
        self.call(
            HttpMethod::Post,
            format!("{}.create_page", PAGE_METHODS),
            json!({ "title": title }),
        )
        .await
    }

    async fn update_page(&self, name: &str, update: PageUpdate) -> Result<PageRef, ServiceError> {
        let mut params = Map::new();
        params.insert("name".into(), json!(name));
        if let Some(title) = update.title {
            params.insert("title".into(), json!(title));
        }
        if let Some(content) = update.content {
            params.insert("content_json".into(), json!(serde_json::to_string(&content)?));
        }
        if let Some(revision) = update.revision {
            params.insert("revision".into(), json!(revision));
        }

        let reference: Option<PageRef> = self
            .call(HttpMethod::Post, format!("{}.update_page", PAGE_METHODS), Value::Object(params))
            .await?;
        Ok(reference.unwrap_or_else(|| PageRef { name: name.to_string() }))
    }

    async fn delete_page(&self, name: &str) -> Result<(), ServiceError> {
        let _: Value = self
            .call(HttpMethod::Post, format!("{}.delete_page", PAGE_METHODS), json!({ "name": name }))
            .await?;
        Ok(())
    }

    async fn upsert_collection(
        &self,
        page: &str,
        block_id: &str,
        upsert: CollectionUpsert,
    ) -> Result<CollectionRecord, ServiceError> {
        self.call_flagged(
            HttpMethod::Post,
            "inline_col_upsert",
            json!({
                "page": page,
                "block_id": block_id,
                "schema": upsert.schema,
                "config": upsert.config,
                "filters": upsert.filters.unwrap_or_default(),
                "sorts": upsert.sorts.unwrap_or_default(),
            }),
        )
        .await
    }

    async fn query_items(
        &self,
        page: &str,
        block_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Item>, ServiceError> {
        let payload: ItemsPayload = self
            .call_flagged(
                HttpMethod::Get,
                "inline_items_query",
                json!({ "page": page, "block_id": block_id, "limit": limit, "offset": offset }),
            )
            .await?;
        Ok(payload.items)
    }

    async fn upsert_item(&self, page: &str, block_id: &str, item: Item) -> Result<Item, ServiceError> {
        let payload: ItemPayload = self
            .call_flagged(
                HttpMethod::Post,
                "inline_item_upsert",
                json!({ "page": page, "block_id": block_id, "item": &item }),
            )
            .await?;
        Ok(payload.item.unwrap_or(item))
    }

    async fn delete_item(&self, page: &str, block_id: &str, item_id: &str) -> Result<(), ServiceError> {
        let _: Empty = self
            .call_flagged(
                HttpMethod::Post,
                "inline_item_delete",
                json!({ "page": page, "block_id": block_id, "item_id": item_id }),
            )
            .await?;
        Ok(())
    }
}
