//! PGXN API client for fetching distributions and release archives

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::version::catalog::{Archive, ReleaseCatalog, ReleaseMeta};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

pub const DEFAULT_MIRROR: &str = "https://api.pgxn.org";

/// PGXN registry client
pub struct PgxnRegistry {
    client: Client,
    base_url: String,
}

impl Default for PgxnRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MIRROR)
    }
}

impl PgxnRegistry {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("pgxn-client/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn dist_url(&self, name: &str) -> String {
        format!("{}/dist/{}.json", self.base_url, name)
    }

    fn meta_url(&self, name: &str, version: &str) -> String {
        format!("{}/dist/{}/{}/META.json", self.base_url, name, version)
    }

    fn archive_url(&self, name: &str, version: &str) -> String {
        format!(
            "{}/dist/{}/{}/{}-{}.zip",
            self.base_url, name, version, name, version
        )
    }

    /// Send a GET request, mapping error statuses to registry errors
    async fn get(&self, url: &str, what: &str) -> Result<Response, RegistryError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            warn!("PGXN returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status {} for {}",
                status, url
            )));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, RegistryError> {
        self.get(url, what).await?.json().await.map_err(|e| {
            warn!("Failed to parse PGXN response from {}: {}", url, e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }

    async fn get_archive(&self, url: &str, what: &str) -> Result<Archive, RegistryError> {
        let bytes = self.get(url, what).await?.bytes().await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);

        Ok(Archive {
            file_name: file_name_from_url(url),
            bytes: bytes.to_vec(),
        })
    }
}

/// Last non-empty path segment of `url`, used as the download file name
fn file_name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(String::from))
        })
        .unwrap_or_else(|| "download".to_string())
}

#[async_trait]
impl Registry for PgxnRegistry {
    async fn fetch_dist(&self, name: &str) -> Result<ReleaseCatalog, RegistryError> {
        let catalog: ReleaseCatalog = self
            .get_json(&self.dist_url(name), &format!("distribution '{}'", name))
            .await?;

        debug!(
            "Found {} release tiers for distribution {}",
            catalog.releases.len(),
            name
        );

        Ok(catalog)
    }

    async fn fetch_meta(&self, name: &str, version: &str) -> Result<ReleaseMeta, RegistryError> {
        self.get_json(
            &self.meta_url(name, version),
            &format!("release '{}-{}'", name, version),
        )
        .await
    }

    async fn fetch_archive(&self, name: &str, version: &str) -> Result<Archive, RegistryError> {
        self.get_archive(
            &self.archive_url(name, version),
            &format!("archive of '{}-{}'", name, version),
        )
        .await
    }

    async fn fetch_url(&self, url: &str) -> Result<Archive, RegistryError> {
        self.get_archive(url, url).await
    }
}
