//! Version management layer
//!
//! Fetches release catalogs from the registry and picks the release a spec
//! asks for.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Catalog   │────▶│  Resolver   │
//! │  (fetch)    │     │  (tiers)    │     │ (best fit)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Registries  │                         │   SemVer    │
//! │   (pgxn)    │                         │ (ordering)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Registry documents (release catalog, release metadata)
//! - [`error`]: Error types for registry operations
//! - [`registry`]: Registry trait for fetching documents and archives
//! - [`registries`]: Concrete registry implementations
//! - [`resolver`]: Best release selection within visible tiers
//! - [`semver`]: Loose version parsing and ordering
//! - [`status`]: Release stability tiers

pub mod catalog;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod status;
