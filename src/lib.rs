//! Resolves canonical icons for the subscription page's client catalog,
//! mirrors them into the asset directories and points the app configuration
//! at them.

pub mod batch;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod logger;
pub mod metadata;
pub mod models;
pub mod patcher;
pub mod registry;
pub mod repository;
pub mod resolver;
pub mod storefront;

pub use batch::{BatchReport, run_batch};
pub use config::{FetcherConfig, load_config};
pub use http::{HttpFetch, ReqwestFetcher};
pub use models::{AppId, ResolvedIcon, SourceDescriptor};
pub use patcher::patch_files;
pub use registry::Catalog;
