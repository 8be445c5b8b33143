use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ClientError;
use crate::version::registries::pgxn::DEFAULT_MIRROR;
use crate::version::status::Status;

/// Name of the configuration directory under the user's config dir
const APP_DIR: &str = "pgxn-client";

/// Client configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base url of the registry mirror
    pub mirror: String,
    /// Least stable release tier to consider
    pub status: Status,
    /// Make program used to build distributions
    pub make: String,
    /// `pg_config` passed to make, if not the one on PATH
    pub pg_config: Option<PathBuf>,
    /// psql program used to load extensions
    pub psql: String,
    /// Program prefixed to `make install`, e.g. "sudo"
    pub sudo: Option<String>,
    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR.to_string(),
            status: Status::Stable,
            make: "make".to_string(),
            pg_config: None,
            psql: "psql".to_string(),
            sudo: None,
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ClientError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| ClientError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Returns the path to the configuration directory for pgxn-client.
/// Uses $XDG_CONFIG_HOME/pgxn-client if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/pgxn-client,
/// or ./pgxn-client if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn client_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ClientConfig>(json!({
            "status": "testing"
        }))
        .unwrap();

        assert_eq!(result.status, Status::Testing);
        assert_eq!(result.mirror, DEFAULT_MIRROR);
        assert_eq!(result.make, "make");
    }

    #[test]
    fn client_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ClientConfig>(json!({
            "mirror": "http://mirror.example.com",
            "status": "unstable",
            "make": "gmake",
            "pgConfig": "/usr/lib/postgresql/16/bin/pg_config",
            "psql": "/usr/bin/psql",
            "sudo": "doas",
            "logFile": "/tmp/pgxn.log"
        }))
        .unwrap();

        assert_eq!(
            result,
            ClientConfig {
                mirror: "http://mirror.example.com".to_string(),
                status: Status::Unstable,
                make: "gmake".to_string(),
                pg_config: Some(PathBuf::from("/usr/lib/postgresql/16/bin/pg_config")),
                psql: "/usr/bin/psql".to_string(),
                sudo: Some("doas".to_string()),
                log_file: Some(PathBuf::from("/tmp/pgxn.log")),
            }
        );
    }

    #[test]
    fn load_returns_defaults_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::load(&dir.path().join("config.json")).unwrap();

        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn load_reports_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, ClientError::Config { path: ref p, .. } if *p == path));
    }

    #[test]
    fn config_dir_with_env_uses_xdg_config_home_when_set() {
        let path = config_dir_with_env(
            Some("/tmp/test-config".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-config/pgxn-client"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_home_config() {
        let path = config_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.config/pgxn-client"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = config_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./pgxn-client"));
    }
}
