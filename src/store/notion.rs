//! Notion database as the record store.
//!
//! ## Requests
//!
//! | Operation | Request |
//! |-----------|---------|
//! | schema | `GET /databases/{id}` |
//! | upload | `POST /file_uploads`, then multipart `POST /file_uploads/{id}/send` |
//! | create | `POST /pages` |
//! | pending | `POST /databases/{id}/query` (paginated, `Status != Resources`) |
//! | describe | `PATCH /pages/{id}` |
//!
//! Every request carries `Authorization: Bearer …` and `Notion-Version`.
//! Non-2xx answers become [`ArchiveError::RecordStore`] with the response
//! body attached, since Notion puts the useful validation message there.

use super::{NewRecord, RecordStore, RecordSummary};
use crate::config::NotionConfig;
use crate::error::ArchiveError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const TITLE_PROPERTY: &str = "Name";
pub const COMPANY_PROPERTY: &str = "Company";
pub const URL_PROPERTY: &str = "URL";
pub const STATUS_PROPERTY: &str = "Status";
pub const DESCRIPTION_PROPERTY: &str = "Company Description";
/// Records in this status are reference material, not applications.
pub const EXCLUDED_STATUS: &str = "Resources";

const PDF_CONTENT_TYPE: &str = "application/pdf";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct NotionStore {
    client: Client,
    config: NotionConfig,
}

impl NotionStore {
    pub fn new(config: NotionConfig) -> Result<Self, ArchiveError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ArchiveError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
    }

    /// Send, check the status, and decode the JSON body.
    async fn send(&self, operation: &str, req: RequestBuilder) -> Result<Value, ArchiveError> {
        let response = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| ArchiveError::RecordStoreUnavailable {
                detail: format!("{operation}: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchiveError::RecordStore {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ArchiveError::RecordStoreUnavailable {
                detail: format!("{operation}: invalid JSON response: {e}"),
            })
    }

    async fn database_properties(&self) -> Result<Map<String, Value>, ArchiveError> {
        let path = format!("databases/{}", self.config.database_id);
        let db = self
            .send("fetch database schema", self.client.get(self.url(&path)))
            .await?;
        Ok(db
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn files_property_type(&self, name: &str) -> Result<Option<String>, ArchiveError> {
        let props = self.database_properties().await?;
        debug!(
            "Database properties: {}",
            props.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        Ok(props
            .get(name)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn upload_document(&self, path: &Path) -> Result<String, ArchiveError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ArchiveError::CaptureReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        let created = self
            .send(
                "create file upload",
                self.client
                    .post(self.url("file_uploads"))
                    .json(&json!({ "filename": filename, "content_type": PDF_CONTENT_TYPE })),
            )
            .await?;
        let upload_id = id_of(&created, "create file upload")?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str(PDF_CONTENT_TYPE)
            .map_err(|e| ArchiveError::Internal(format!("multipart part: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.send(
            "send file upload",
            self.client
                .post(self.url(&format!("file_uploads/{upload_id}/send")))
                .multipart(form),
        )
        .await?;

        info!("Uploaded {} as file upload {}", filename, upload_id);
        Ok(upload_id)
    }

    async fn create_record(&self, record: &NewRecord) -> Result<String, ArchiveError> {
        let body = page_payload(&self.config.database_id, record);
        let page = self
            .send("create page", self.client.post(self.url("pages")).json(&body))
            .await?;
        id_of(&page, "create page")
    }

    async fn pending_descriptions(&self) -> Result<Vec<RecordSummary>, ArchiveError> {
        let path = format!("databases/{}/query", self.config.database_id);
        let mut cursor: Option<String> = None;
        let mut records = Vec::new();

        loop {
            let body = query_payload(cursor.as_deref());
            let page = self
                .send("query database", self.client.post(self.url(&path)).json(&body))
                .await?;

            if let Some(results) = page.get("results").and_then(Value::as_array) {
                records.extend(results.iter().filter_map(summary_from_page));
            }

            let has_more = page.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            cursor = page
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if !has_more || cursor.is_none() {
                break;
            }
        }

        debug!("{} records eligible for descriptions", records.len());
        Ok(records)
    }

    async fn set_description(&self, record_id: &str, text: &str) -> Result<(), ArchiveError> {
        let body = json!({
            "properties": {
                DESCRIPTION_PROPERTY: { "type": "rich_text", "rich_text": rich_text(text) }
            }
        });
        self.send(
            "update page",
            self.client
                .patch(self.url(&format!("pages/{record_id}")))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

// ── Payloads ─────────────────────────────────────────────────────────────

fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

/// Body of `POST /pages` for `record`.
pub fn page_payload(database_id: &str, record: &NewRecord) -> Value {
    let mut properties = Map::new();
    properties.insert(TITLE_PROPERTY.into(), json!({ "title": rich_text(&record.title) }));
    properties.insert(
        COMPANY_PROPERTY.into(),
        json!({ "rich_text": rich_text(&record.company) }),
    );
    properties.insert(URL_PROPERTY.into(), json!({ "url": record.url }));

    if let Some(att) = &record.attachment {
        properties.insert(
            att.property.clone(),
            json!({
                "type": "files",
                "files": [{
                    "type": "file_upload",
                    "file_upload": { "id": att.upload_id },
                    "name": att.name,
                }]
            }),
        );
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

/// Body of one `POST /databases/{id}/query` page.
pub fn query_payload(start_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": {
            "property": STATUS_PROPERTY,
            "status": { "does_not_equal": EXCLUDED_STATUS }
        }
    });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }
    body
}

fn id_of(value: &Value, operation: &str) -> Result<String, ArchiveError> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ArchiveError::RecordStoreUnavailable {
            detail: format!("{operation}: response has no id"),
        })
}

// ── Property readers ─────────────────────────────────────────────────────

/// Plain text of a title, rich_text, select, or multi_select property.
pub fn property_text(properties: &Value, name: &str) -> String {
    let Some(prop) = properties.get(name) else {
        return String::new();
    };
    match prop.get("type").and_then(Value::as_str) {
        Some(kind @ ("title" | "rich_text")) => prop
            .get(kind)
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("plain_text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string(),
        Some("select") => prop
            .pointer("/select/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some("multi_select") => prop
            .get("multi_select")
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// True when `name` is a rich_text property with any non-blank text.
pub fn has_rich_text(properties: &Value, name: &str) -> bool {
    let Some(prop) = properties.get(name) else {
        return false;
    };
    if prop.get("type").and_then(Value::as_str) != Some("rich_text") {
        return false;
    }
    prop.get("rich_text")
        .and_then(Value::as_array)
        .map(|parts| {
            parts.iter().any(|p| {
                p.get("plain_text")
                    .and_then(Value::as_str)
                    .map(|t| !t.trim().is_empty())
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

fn summary_from_page(page: &Value) -> Option<RecordSummary> {
    let id = page.get("id").and_then(Value::as_str)?.to_string();
    let empty = Value::Object(Map::new());
    let props = page.get("properties").unwrap_or(&empty);
    Some(RecordSummary {
        id,
        name: property_text(props, TITLE_PROPERTY),
        company: property_text(props, COMPANY_PROPERTY),
        has_description: has_rich_text(props, DESCRIPTION_PROPERTY),
    })
}
