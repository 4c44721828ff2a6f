//! Shared types, error model, and configuration for the KM portal.
//!
//! This crate is the foundation depended on by all other portal crates.
//! It provides:
//! - [`PortalError`]: the unified error type
//! - Contribution types ([`KnowledgeContribution`], [`ReviewState`], [`ContributionId`])
//! - Taxonomy types ([`Catalog`], [`Department`], [`Topic`], [`KnowledgeAsset`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod taxonomy;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, DEFAULT_MIN_QUERY_CHARS, DefaultsConfig, ExplorerConfig,
    config_dir, config_file_path, expand_home, init_config, load_config, load_config_from,
};
pub use error::{PortalError, Result};
pub use taxonomy::{
    AssetStatus, Catalog, Crumb, Department, KnowledgeAsset, KnowledgeTopic, Locale,
    LocalizedName, TagOption, Topic, Vocabulary, derived_key,
};
pub use types::{
    CURRENT_SCHEMA_VERSION, ContributionId, ContributionStatus, ContributionUpdate, Contributor,
    FileRef, KnowledgeContribution, NewContribution, Review, ReviewState, Reviewer, Role, User,
};
