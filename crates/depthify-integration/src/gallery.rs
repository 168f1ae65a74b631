//! Public, unauthenticated read endpoints: gallery, health, and stats

use reqwest::Client;

use crate::error::{IntegrationError, Operation};
use crate::projects::handle_response;
use crate::types::{Gallery, GalleryItem, HealthStatus, Stats};

/// API client for the public read endpoints
pub struct GalleryApi {
    client: Client,
    base_url: String,
}

impl GalleryApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Recently completed projects from every user
    pub async fn gallery(&self) -> Result<Vec<GalleryItem>, IntegrationError> {
        let gallery: Gallery = self.get("/api/gallery").await?;
        Ok(gallery.gallery)
    }

    /// Backend liveness
    pub async fn health(&self) -> Result<HealthStatus, IntegrationError> {
        self.get("/api/health").await
    }

    /// Aggregate counters
    pub async fn stats(&self) -> Result<Stats, IntegrationError> {
        self.get("/api/stats").await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, IntegrationError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Operation::Fetch.transport(e))?;

        handle_response(Operation::Fetch, response).await
    }
}
