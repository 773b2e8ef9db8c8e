use std::sync::Arc;

use async_trait::async_trait;
use deck_core::api::{
    ApiResponse, DeckContent, ListFilesData, RemoveRequest, UpdateRequest,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;
use crate::repository::{DeckStore, Storage, StoreError};

/// Deck store reached over the JSON HTTP API.
#[derive(Clone)]
pub struct HttpDeckStore {
    client: Client,
    config: StoreConfig,
}

impl HttpDeckStore {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(client: Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn content_url(&self, filename: &str, data_only: bool) -> Url {
        let mut url = self.config.endpoint(&["getContentByName", filename]);
        url.query_pairs_mut()
            .append_pair("data_only", if data_only { "true" } else { "false" });
        url
    }

    async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus(status));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StoreError> {
        let body = Self::send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and unwrap its envelope.
    async fn enveloped<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<Option<T>, StoreError> {
        let envelope: ApiResponse<T> = Self::json(request).await?;
        Ok(envelope.into_result()?)
    }
}

#[async_trait]
impl DeckStore for HttpDeckStore {
    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let url = self.config.endpoint(&["list"]);
        debug!(%url, "listing deck files");
        let data: ListFilesData = Self::enveloped(self.client.get(url))
            .await?
            .ok_or(StoreError::MissingData)?;
        Ok(data.filenames)
    }

    async fn fetch_deck(&self, filename: &str) -> Result<DeckContent, StoreError> {
        let url = self.content_url(filename, false);
        debug!(filename, "fetching deck");
        Self::enveloped(self.client.get(url))
            .await?
            .ok_or(StoreError::MissingData)
    }

    async fn fetch_deck_data_only(&self, filename: &str) -> Result<DeckContent, StoreError> {
        let url = self.content_url(filename, true);
        debug!(filename, "fetching raw deck body");
        Self::json(self.client.get(url)).await
    }

    async fn upsert_deck(&self, filename: &str, content: &DeckContent) -> Result<(), StoreError> {
        let url = self.config.endpoint(&["update"]);
        debug!(filename, cards = content.cards().len(), "upserting deck");
        let body = UpdateRequest {
            filename: filename.to_owned(),
            content: content.clone(),
        };
        Self::enveloped::<IgnoredAny>(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn remove_file(&self, filename: &str) -> Result<(), StoreError> {
        let url = self.config.endpoint(&["remove"]);
        debug!(filename, "removing deck file");
        let body = RemoveRequest {
            filename: filename.to_owned(),
        };
        Self::enveloped::<IgnoredAny>(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by the HTTP deck store.
    #[must_use]
    pub fn http(config: StoreConfig) -> Self {
        Self {
            decks: Arc::new(HttpDeckStore::new(config)),
        }
    }
}
