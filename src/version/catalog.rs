//! Registry documents describing a distribution and its releases

use std::collections::HashMap;

use serde::Deserialize;

/// One published release of a distribution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Version string exactly as published
    pub version: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl Release {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            date: None,
        }
    }
}

/// The releases of one distribution, grouped by stability tier name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseCatalog {
    #[serde(default)]
    pub name: Option<String>,
    pub releases: HashMap<String, Vec<Release>>,
}

impl ReleaseCatalog {
    /// Build a catalog from `(tier, versions)` pairs
    pub fn from_tiers(tiers: &[(&str, Vec<&str>)]) -> Self {
        let releases = tiers
            .iter()
            .map(|(tier, versions)| {
                (
                    tier.to_string(),
                    versions.iter().map(|v| Release::new(v)).collect(),
                )
            })
            .collect();

        Self {
            name: None,
            releases,
        }
    }
}

/// Metadata of a single release, as served in its `META.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseMeta {
    pub name: String,
    pub version: String,
    /// Hex SHA-1 of the release archive
    pub sha1: String,
    #[serde(default, rename = "abstract")]
    pub abstract_: Option<String>,
}

/// A downloaded archive, not yet written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// File name suggested by the source
    pub file_name: String,
    pub bytes: Vec<u8>,
}
