// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod utils;

pub use client::{DbSnpClient, HttpRequest, HttpResponse, QueryOutcome, ReqwestTransport, Transport};
pub use config::{Config, NcbiConfig, SearchConfig};
pub use error::{DbSnpError, Result};
pub use mcp::DbSnpMcp;
pub use models::{
    ClinicalAnnotation, ClinicalSignificanceResult, RsId, SnpQuery, SnpResult, SnpSearchResults,
};
pub use utils::Validator;
