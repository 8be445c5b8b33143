//! Client for the PostgreSQL Extension Network
//!
//! Turns command-line specs into registry releases and drives the local
//! build tools that install, check and load them.
//!
//! # Modules
//!
//! - [`spec`]: Command-line spec parsing
//! - [`version`]: Registry access and best release resolution
//! - [`commands`]: download / install / check / load
//! - [`config`]: Client configuration
//! - [`error`]: Error kinds and exit codes

pub mod commands;
pub mod config;
pub mod error;
pub mod spec;
pub mod version;
