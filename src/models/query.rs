// file: src/models/query.rs
// description: validated rs identifiers and query variants
// reference: https://www.ncbi.nlm.nih.gov/snp/docs/RefSNP_about/

use crate::error::Result;
use crate::utils::validation::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dbSNP reference SNP identifier, always stored as lowercase `rs` + digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RsId(String);

impl RsId {
    pub fn parse(raw: &str) -> Result<Self> {
        Validator::validate_rs_id(raw).map(Self)
    }

    /// Builds an id from the bare numeric form NCBI uses in uid lists.
    pub fn from_number(number: &str) -> Result<Self> {
        Self::parse(&format!("rs{}", number.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric part, as expected by E-utilities and Variation Services.
    pub fn number(&self) -> &str {
        &self.0[2..]
    }
}

impl fmt::Display for RsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RsId {
    type Err = crate::error::DbSnpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RsId {
    type Error = crate::error::DbSnpError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RsId> for String {
    fn from(id: RsId) -> Self {
        id.0
    }
}

/// One request against dbSNP. The constructors validate; `DbSnpClient::run`
/// checks search arguments again for hand-built values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnpQuery {
    ByRsId(RsId),
    BySearchTerm { term: String, limit: usize },
    ClinicalLookup(RsId),
}

impl SnpQuery {
    pub fn by_rs_id(raw: &str) -> Result<Self> {
        RsId::parse(raw).map(SnpQuery::ByRsId)
    }

    pub fn clinical(raw: &str) -> Result<Self> {
        RsId::parse(raw).map(SnpQuery::ClinicalLookup)
    }

    pub fn search(
        term: &str,
        limit: Option<i64>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self> {
        let term = Validator::validate_term(term)?;
        let limit = Validator::validate_limit(limit, default_limit, max_limit)?;
        Ok(SnpQuery::BySearchTerm { term, limit })
    }
}
