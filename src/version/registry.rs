//! Registry trait for fetching distribution documents and archives

#[cfg(test)]
use mockall::automock;

use crate::version::catalog::{Archive, ReleaseCatalog, ReleaseMeta};
use crate::version::error::RegistryError;

/// Trait for talking to a package registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the releases of a distribution, grouped by tier
    ///
    /// # Arguments
    /// * `name` - Normalized distribution name (e.g., "semver")
    async fn fetch_dist(&self, name: &str) -> Result<ReleaseCatalog, RegistryError>;

    /// Fetches the metadata of one release, including its checksum
    async fn fetch_meta(&self, name: &str, version: &str) -> Result<ReleaseMeta, RegistryError>;

    /// Fetches the archive of one release
    async fn fetch_archive(&self, name: &str, version: &str) -> Result<Archive, RegistryError>;

    /// Fetches an archive from an arbitrary url
    async fn fetch_url(&self, url: &str) -> Result<Archive, RegistryError>;
}
