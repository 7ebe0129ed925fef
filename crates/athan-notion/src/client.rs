//! Notion REST client implementation.
//!
//! One page-creation call per voice note: icon, title property, summary
//! rich_text, category select, tag multi-select, and the full transcription
//! chunked into paragraph blocks under Notion's 2000-character block limit.
//! The writer never raises — persistence failure is an expected outcome the
//! caller branches on, so it is carried in the returned value.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use athan_core::{
    chunk_content, defaults, truncate_summary, truncate_text, CategoryRegistry, CreatePageResult,
    Error, NotePageWriter, Result, VoiceNoteData,
};

/// Default Notion endpoint.
pub const DEFAULT_NOTION_URL: &str = defaults::NOTION_BASE_URL;

/// Timeout for Notion requests (seconds).
pub const NOTION_TIMEOUT_SECS: u64 = 30;

/// Notion API client scoped to one database.
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
    database_id: String,
    registry: CategoryRegistry,
}

impl NotionClient {
    /// Create a client against the production Notion endpoint.
    pub fn new(api_key: String, database_id: String, registry: CategoryRegistry) -> Self {
        Self::with_config(DEFAULT_NOTION_URL.to_string(), api_key, database_id, registry)
    }

    /// Create a client with a custom endpoint.
    pub fn with_config(
        base_url: String,
        api_key: String,
        database_id: String,
        registry: CategoryRegistry,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(NOTION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(database_id = %database_id, "Initializing Notion client");

        Self {
            client,
            base_url,
            api_key,
            database_id,
            registry,
        }
    }

    /// Create from environment variables.
    ///
    /// Missing `NOTION_API_KEY` or `NOTION_DATABASE_ID` is a fatal
    /// configuration error.
    pub fn from_env(registry: CategoryRegistry) -> Result<Self> {
        let api_key = std::env::var(defaults::ENV_NOTION_API_KEY)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config("NOTION_API_KEY is not defined in environment variables".to_string())
            })?;
        let database_id = std::env::var(defaults::ENV_NOTION_DATABASE_ID)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "NOTION_DATABASE_ID is not defined in environment variables".to_string(),
                )
            })?;
        Ok(Self::new(api_key, database_id, registry))
    }

    /// Derive a browsable page URL from an opaque page ID.
    pub fn page_url_from_id(page_id: &str) -> String {
        format!(
            "{}{}",
            defaults::NOTION_PAGE_URL_PREFIX,
            page_id.replace('-', "")
        )
    }

    /// The fallible page-creation path; `create_voice_note_page` converts
    /// any error into a failure result.
    async fn create_page_internal(&self, data: &VoiceNoteData) -> Result<(String, String)> {
        let start = Instant::now();

        let summary = truncate_summary(&data.summary, defaults::SUMMARY_MAX_LEN);
        let title = truncate_text(&data.title, defaults::TITLE_MAX_LEN);
        let tags: Vec<serde_json::Value> = data
            .tags
            .iter()
            .map(|tag| json!({ "name": truncate_text(tag, defaults::TAG_MAX_LEN) }))
            .collect();

        let children: Vec<serde_json::Value> = chunk_content(&data.content, defaults::NOTION_CHUNK_SIZE)
            .into_iter()
            .map(|chunk| {
                json!({
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": {
                        "rich_text": [
                            { "type": "text", "text": { "content": chunk } }
                        ]
                    }
                })
            })
            .collect();

        let block_count = children.len();
        let body = json!({
            "parent": { "database_id": self.database_id },
            "icon": { "type": "emoji", "emoji": self.registry.icon(&data.category) },
            "properties": {
                "Name": {
                    "title": [
                        { "text": { "content": title } }
                    ]
                },
                "Summary": {
                    "rich_text": [
                        { "text": { "content": summary } }
                    ]
                },
                "Category": {
                    "select": { "name": data.category }
                },
                "Tags": {
                    "multi_select": tags
                }
            },
            "children": children,
        });

        let response = self
            .client
            .post(format!("{}/v1/pages", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", defaults::NOTION_API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Notion(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Notion wraps its error text in {"message": "..."}.
            let message = serde_json::from_str::<NotionErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(Error::Notion(format!(
                "Notion returned {}: {}",
                status, message
            )));
        }

        let result: CreatePageResponse = response
            .json()
            .await
            .map_err(|e| Error::Notion(format!("Failed to parse response: {}", e)))?;

        let page_url = Self::page_url_from_id(&result.id);
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            page_id = %result.id,
            blocks = block_count,
            duration_ms = elapsed,
            "Page created"
        );

        Ok((result.id, page_url))
    }
}

#[derive(Deserialize)]
struct CreatePageResponse {
    id: String,
}

#[derive(Deserialize)]
struct NotionErrorBody {
    message: String,
}

#[async_trait]
impl NotePageWriter for NotionClient {
    async fn create_voice_note_page(&self, data: &VoiceNoteData) -> CreatePageResult {
        // Defense in depth: the orchestrator path has already schema-checked
        // the category, but other callers (the self-test endpoint) must not
        // be able to break the write with an invalid one.
        let category = self.registry.validate_or_fallback(&data.category);
        let validated = VoiceNoteData {
            category: category.clone(),
            ..data.clone()
        };

        match self.create_page_internal(&validated).await {
            Ok((page_id, page_url)) => CreatePageResult {
                success: true,
                page_id: Some(page_id),
                page_url: Some(page_url),
                category_mapped: Some(category),
                error: None,
            },
            Err(e) => {
                error!(error = %e, "Failed to create Notion page");
                CreatePageResult::failure(e.to_string())
            }
        }
    }

    async fn validate_database(&self) -> bool {
        let url = format!("{}/v1/databases/{}", self.base_url, self.database_id);
        match self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", defaults::NOTION_API_VERSION)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                error!(error = %e, "Failed to validate Notion database");
                false
            }
        }
    }
}
