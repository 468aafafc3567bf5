// file: src/client/mod.rs
// description: NCBI dbSNP client module exports
// reference: https://www.ncbi.nlm.nih.gov/books/NBK25501/

pub mod adapter;
pub mod eutils;
pub mod transport;
pub mod variation;

pub use adapter::{DbSnpClient, QueryOutcome};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
