//! Client commands
//!
//! Groups the collaborators every command needs:
//! - a [`Registry`] to fetch catalogs, metadata and archives
//! - a [`CommandRunner`] to drive make and psql
//! - the effective [`ClientConfig`]
//!
//! # Modules
//!
//! - [`download`]: Resolve, fetch, verify and save release archives
//! - [`build`]: `make` / `make install` / `make installcheck`
//! - [`load`]: Load an extension into a database with psql
//! - [`runner`]: External program execution

pub mod build;
pub mod download;
pub mod load;
pub mod runner;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::version::registries::PgxnRegistry;
use crate::version::registry::Registry;
use runner::{CommandRunner, SystemRunner};

pub struct Context {
    pub registry: Arc<dyn Registry>,
    pub runner: Arc<dyn CommandRunner>,
    pub config: ClientConfig,
}

impl Context {
    /// Context talking to the configured mirror and running real programs
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            registry: Arc::new(PgxnRegistry::new(&config.mirror)),
            runner: Arc::new(SystemRunner),
            config,
        }
    }
}
