// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod clinical;
pub mod query;
pub mod snp;

pub use clinical::{ClinicalAnnotation, ClinicalSignificanceResult, NO_CLINICAL_DATA};
pub use query::{RsId, SnpQuery};
pub use snp::{SnpResult, SnpSearchResults};
