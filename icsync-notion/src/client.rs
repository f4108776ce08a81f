//! Thin typed client for the handful of Notion endpoints icsync uses.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::NotionError;

pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

// Response types

#[derive(Debug, Deserialize)]
pub struct Database {
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Result<Self, NotionError> {
        Self::with_base_url(token, NOTION_API_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, NotionError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(NotionClient {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NotionError> {
        let resp = request.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => (err.code, err.message),
                Err(_) => (String::new(), body),
            };
            return Err(NotionError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// GET /databases/:id
    pub async fn retrieve_database(&self, database_id: &str) -> Result<Database, NotionError> {
        self.send(self.request(Method::GET, &format!("/databases/{database_id}")))
            .await
    }

    /// POST /databases/:id/query
    pub async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = Value::String(cursor.to_string());
        }

        let resp: QueryResponse = self
            .send(
                self.request(Method::POST, &format!("/databases/{database_id}/query"))
                    .json(&body),
            )
            .await?;

        if resp.has_more && resp.next_cursor.is_none() {
            return Err(NotionError::InvalidResponse(
                "query reported more results without a next_cursor".to_string(),
            ));
        }
        Ok(resp)
    }

    /// POST /databases/:id/query with a filter, first page only.
    pub async fn query_database_filtered(
        &self,
        database_id: &str,
        filter: Value,
        page_size: u32,
    ) -> Result<QueryResponse, NotionError> {
        let body = json!({ "filter": filter, "page_size": page_size });
        self.send(
            self.request(Method::POST, &format!("/databases/{database_id}/query"))
                .json(&body),
        )
        .await
    }

    /// POST /pages
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<Page, NotionError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.send(self.request(Method::POST, "/pages").json(&body))
            .await
    }

    /// PATCH /pages/:id
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> Result<Page, NotionError> {
        let body = json!({ "properties": properties });
        self.send(
            self.request(Method::PATCH, &format!("/pages/{page_id}"))
                .json(&body),
        )
        .await
    }
}
