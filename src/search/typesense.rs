use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use crate::search::models::{DocumentPatch, IndexDocument, SearchResponse};
use crate::search::SearchIndex;
use crate::utils::Config;

/// Field used for the match-all search during pagination.
const QUERY_BY_FIELD: &str = "product_name";

/// Numeric fields the backfill writes; both must exist on the collection
/// schema before the first document update references them.
const BACKFILL_FIELDS: [&str; 2] = ["created_at", "deleted_at"];

/// Typesense client for the products search collection.
pub struct TypesenseIndex {
    base_url: String,
    api_key: String,
    collection: String,
    client: reqwest::Client,
}

impl TypesenseIndex {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.typesense_connection_timeout))
            .build()?;

        Ok(Self {
            base_url: format!(
                "{}://{}:{}",
                config.typesense_protocol, config.typesense_host, config.typesense_port
            ),
            api_key: config.typesense_api_key.clone(),
            collection: config.typesense_collection.clone(),
            client,
        })
    }

    /// Add created_at/deleted_at to the collection schema if missing.
    /// Also serves as the startup reachability check for the index.
    pub async fn ensure_schema_fields(&self) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let response = self
            .client
            .get(&url)
            .header("X-TYPESENSE-API-KEY", &self.api_key)
            .send()
            .await
            .context("failed to read Typesense collection schema")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Typesense collection {} not available: {}",
                self.collection,
                response.status()
            ));
        }

        let schema: serde_json::Value = response.json().await?;
        let present: Vec<&str> = schema["fields"]
            .as_array()
            .map(|fields| fields.iter().filter_map(|f| f["name"].as_str()).collect())
            .unwrap_or_default();

        let missing: Vec<serde_json::Value> = BACKFILL_FIELDS
            .into_iter()
            .filter(|name| !present.contains(name))
            .map(|name| json!({ "name": name, "type": "int64", "optional": true }))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        tracing::info!(
            "Adding {} missing schema field(s) to {}",
            missing.len(),
            self.collection
        );

        let response = self
            .client
            .patch(&url)
            .header("X-TYPESENSE-API-KEY", &self.api_key)
            .json(&json!({ "fields": missing }))
            .send()
            .await
            .context("failed to extend Typesense schema")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Typesense schema update failed: {}",
                response.status()
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl SearchIndex for TypesenseIndex {
    async fn update_document_fields(&self, id: i64, patch: DocumentPatch) -> Result<bool> {
        let url = format!(
            "{}/collections/{}/documents/{}",
            self.base_url, self.collection, id
        );
        let response = self
            .client
            .patch(&url)
            .header("X-TYPESENSE-API-KEY", &self.api_key)
            .json(&patch)
            .send()
            .await
            .context("Typesense document update request failed")?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(anyhow!("Typesense document update failed: {}", status)),
        }
    }

    async fn list_documents(&self, page: u32, page_size: u32) -> Result<Vec<IndexDocument>> {
        let url = format!(
            "{}/collections/{}/documents/search",
            self.base_url, self.collection
        );

        // Typesense pages are 1-based; the capability contract is 0-based.
        let response = self
            .client
            .get(&url)
            .header("X-TYPESENSE-API-KEY", &self.api_key)
            .query(&[
                ("q", "*".to_string()),
                ("query_by", QUERY_BY_FIELD.to_string()),
                ("page", (page + 1).to_string()),
                ("per_page", page_size.to_string()),
            ])
            .send()
            .await
            .context("Typesense search request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Typesense search failed: {}", response.status()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.hits.into_iter().map(|hit| hit.document).collect())
    }
}
