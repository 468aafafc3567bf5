// file: src/client/adapter.rs
// description: dbSNP client exposing rs lookup, term search and clinical significance
// reference: https://www.ncbi.nlm.nih.gov/snp/docs/

use crate::client::eutils;
use crate::client::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::client::variation;
use crate::config::{Config, NcbiConfig, SearchConfig};
use crate::error::{DbSnpError, Result};
use crate::models::{
    ClinicalSignificanceResult, RsId, SnpQuery, SnpResult, SnpSearchResults,
};
use crate::utils::validation::Validator;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Error bodies are short; anything longer is a real payload and is not
/// scanned for a rate limit message.
const MAX_ERROR_BODY_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Snp(SnpResult),
    Search(SnpSearchResults),
    Clinical(ClinicalSignificanceResult),
}

impl QueryOutcome {
    pub fn format_summary(&self) -> String {
        match self {
            QueryOutcome::Snp(result) => result.format_summary(),
            QueryOutcome::Search(results) => results.format_summary(),
            QueryOutcome::Clinical(result) => result.format_summary(),
        }
    }
}

/// Stateless adapter over NCBI. Holds read-only configuration and a shared
/// transport, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct DbSnpClient {
    ncbi: NcbiConfig,
    search: SearchConfig,
    transport: Arc<dyn Transport>,
}

impl DbSnpClient {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.ncbi)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            ncbi: config.ncbi.clone(),
            search: config.search.clone(),
            transport,
        }
    }

    pub async fn get_snp_by_rs(&self, rs_id: &str) -> Result<SnpResult> {
        let id = RsId::parse(rs_id)?;
        self.fetch_snp(&id).await
    }

    pub async fn search_snps(&self, term: &str, limit: Option<i64>) -> Result<SnpSearchResults> {
        let term = Validator::validate_term(term)?;
        let limit =
            Validator::validate_limit(limit, self.search.default_limit, self.search.max_limit)?;
        self.search_term(&term, limit).await
    }

    pub async fn get_snp_clinical_significance(
        &self,
        rs_id: &str,
    ) -> Result<ClinicalSignificanceResult> {
        let id = RsId::parse(rs_id)?;
        self.fetch_clinical(&id).await
    }

    pub async fn run(&self, query: &SnpQuery) -> Result<QueryOutcome> {
        match query {
            SnpQuery::ByRsId(id) => self.fetch_snp(id).await.map(QueryOutcome::Snp),
            SnpQuery::BySearchTerm { term, limit } => {
                let limit = i64::try_from(*limit).unwrap_or(i64::MAX);
                self.search_snps(term, Some(limit))
                    .await
                    .map(QueryOutcome::Search)
            }
            SnpQuery::ClinicalLookup(id) => {
                self.fetch_clinical(id).await.map(QueryOutcome::Clinical)
            }
        }
    }

    async fn fetch_snp(&self, id: &RsId) -> Result<SnpResult> {
        info!("Requesting SNP data for {}", id);

        let request = eutils::esummary_request(&self.ncbi, &[id.number()]);
        let body = self.fetch(&request, "esummary").await?;
        let mut summaries = eutils::parse_esummary(&body)?;

        match summaries.remove(id.number()) {
            Some(result) => {
                info!("Retrieved SNP data for {}", id);
                Ok(result)
            }
            None => {
                info!("{} not found in dbSNP", id);
                Ok(SnpResult::not_found(id.as_str()))
            }
        }
    }

    async fn search_term(&self, term: &str, limit: usize) -> Result<SnpSearchResults> {
        info!("Searching SNPs with term: {}, limit: {}", term, limit);

        let request = eutils::esearch_request(&self.ncbi, term, limit);
        let body = self.fetch(&request, "esearch").await?;
        let hits = eutils::parse_esearch(&body)?;

        let ids = hits
            .ids
            .iter()
            .take(limit)
            .map(|number| {
                RsId::from_number(number).map_err(|_| {
                    DbSnpError::UpstreamUnavailable(format!(
                        "esearch returned a non-numeric id: {}",
                        number
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let results = if ids.is_empty() || !self.search.fetch_summaries {
            ids.iter().map(|id| SnpResult::id_only(id.as_str())).collect()
        } else {
            let numbers: Vec<&str> = ids.iter().map(RsId::number).collect();
            let request = eutils::esummary_request(&self.ncbi, &numbers);
            let body = self.fetch(&request, "esummary").await?;
            let mut summaries = eutils::parse_esummary(&body)?;

            ids.iter()
                .map(|id| {
                    summaries
                        .remove(id.number())
                        .unwrap_or_else(|| SnpResult::not_found(id.as_str()))
                })
                .collect()
        };

        info!(
            "Search for '{}' returned {} of {} matches",
            term,
            ids.len(),
            hits.total_count
        );

        Ok(SnpSearchResults {
            term: term.to_string(),
            total_count: hits.total_count,
            results,
        })
    }

    async fn fetch_clinical(&self, id: &RsId) -> Result<ClinicalSignificanceResult> {
        info!("Requesting clinical significance data for {}", id);

        let request = variation::refsnp_request(&self.ncbi, id);
        let response = self.send(&request).await?;

        // refsnp answers 404 for ids it has no record of
        if response.status == 404 {
            info!("{} has no RefSNP record", id);
            return Ok(ClinicalSignificanceResult::no_data(id.as_str()));
        }

        let body = check_response(response, "refsnp")?;
        let result = variation::parse_refsnp(&body, id)?;
        info!(
            "Extracted {} clinical classifications for {}",
            result.classifications.len(),
            id
        );
        Ok(result)
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.transport.get(request).await.inspect_err(|e| {
            error!("Request to {} failed: {}", request.url, e);
        })
    }

    async fn fetch(&self, request: &HttpRequest, endpoint: &str) -> Result<String> {
        let response = self.send(request).await?;
        check_response(response, endpoint)
    }
}

/// Interprets status and throttling signals, returning the body on success.
pub(crate) fn check_response(response: HttpResponse, endpoint: &str) -> Result<String> {
    if response.status == 429 {
        let message = rate_limit_message(&response.body)
            .unwrap_or_else(|| "HTTP 429 Too Many Requests".to_string());
        warn!("{} rate limited: {}", endpoint, message);
        return Err(DbSnpError::RateLimited(message));
    }

    if let Some(message) = rate_limit_message(&response.body) {
        warn!("{} rate limited: {}", endpoint, message);
        return Err(DbSnpError::RateLimited(message));
    }

    if !response.is_success() {
        error!("{} returned HTTP {}", endpoint, response.status);
        return Err(DbSnpError::UpstreamUnavailable(format!(
            "{} returned HTTP {}: {}",
            endpoint,
            response.status,
            Validator::truncate_text(response.body.trim(), 200)
        )));
    }

    Ok(response.body)
}

/// NCBI reports throttling as `{"error": "API rate limit exceeded", ...}`.
fn rate_limit_message(body: &str) -> Option<String> {
    if body.len() > MAX_ERROR_BODY_LEN {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.as_str()?;
    message
        .to_lowercase()
        .contains("rate limit")
        .then(|| message.to_string())
}
