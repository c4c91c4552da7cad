//! Google Ads campaign provisioning pipeline.
//!
//! Reads a tabular campaign definition file, generates platform-compliant
//! responsive-search-ad copy, and drives the budget → campaign → ad group
//! → keywords → ad creation sequence against the Google Ads API, mirroring
//! every created resource into Postgres.
//!
//! # Modules
//!
//! - `ad_copy`: Headline/description generation with platform caps.
//! - `ads_api`: The injectable remote-platform adapter contract.
//! - `config`: Configuration management.
//! - `conversion_label`: Label recovery from conversion tag snippets.
//! - `db`: Database connection and pool management.
//! - `definition_parser`: Tabular definition-file parsing.
//! - `errors`: Error handling types.
//! - `google_ads`: Google Ads REST client.
//! - `mirror`: Local persistence mirror for created resources.
//! - `models`: Core data models.
//! - `orchestrator`: The batch provisioning driver.

pub mod ad_copy;
pub mod ads_api;
pub mod config;
pub mod conversion_label;
pub mod db;
pub mod definition_parser;
pub mod errors;
pub mod google_ads;
pub mod mirror;
pub mod models;
pub mod orchestrator;
