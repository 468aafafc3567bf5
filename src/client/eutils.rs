// file: src/client/eutils.rs
// description: E-utilities (esearch/esummary) requests and response mapping for db=snp
// reference: https://www.ncbi.nlm.nih.gov/books/NBK25499/

use crate::client::transport::HttpRequest;
use crate::config::NcbiConfig;
use crate::error::{DbSnpError, Result};
use crate::models::{SnpResult, clinical::normalize_label};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const DATABASE: &str = "snp";

pub fn esearch_request(config: &NcbiConfig, term: &str, limit: usize) -> HttpRequest {
    let request = HttpRequest::get(endpoint(config, "esearch.fcgi"))
        .query("db", DATABASE)
        .query("term", term)
        .query("retmode", "json")
        .query("retmax", limit.to_string());
    with_common_params(request, config)
}

/// `numbers` are bare numeric rs ids; NCBI accepts them comma-joined.
pub fn esummary_request(config: &NcbiConfig, numbers: &[&str]) -> HttpRequest {
    let request = HttpRequest::get(endpoint(config, "esummary.fcgi"))
        .query("db", DATABASE)
        .query("id", numbers.join(","))
        .query("retmode", "json");
    with_common_params(request, config)
}

fn endpoint(config: &NcbiConfig, name: &str) -> String {
    format!("{}/{}", config.eutils_base_url.trim_end_matches('/'), name)
}

fn with_common_params(mut request: HttpRequest, config: &NcbiConfig) -> HttpRequest {
    if let Some(key) = &config.api_key {
        request = request.query("api_key", key.as_str());
    }
    if !config.tool.is_empty() {
        request = request.query("tool", config.tool.as_str());
    }
    if let Some(email) = &config.email {
        request = request.query("email", email.as_str());
    }
    request
}

#[derive(Debug, Deserialize)]
struct ESearchEnvelope {
    #[serde(default)]
    esearchresult: Option<ESearchResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ESearchResult {
    count: Option<String>,
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ESearchHits {
    pub total_count: u64,
    /// Bare numeric ids in upstream order
    pub ids: Vec<String>,
}

pub fn parse_esearch(body: &str) -> Result<ESearchHits> {
    let envelope: ESearchEnvelope = serde_json::from_str(body)
        .map_err(|e| DbSnpError::UpstreamUnavailable(format!("Malformed esearch response: {}", e)))?;

    let result = match (envelope.esearchresult, envelope.error) {
        (Some(result), _) => result,
        (None, Some(error)) => {
            return Err(DbSnpError::UpstreamUnavailable(format!("esearch error: {}", error)));
        }
        (None, None) => {
            return Err(DbSnpError::UpstreamUnavailable(
                "Malformed esearch response: missing esearchresult".to_string(),
            ));
        }
    };

    if let Some(error) = result.error {
        return Err(DbSnpError::UpstreamUnavailable(format!("esearch error: {}", error)));
    }

    let total_count = result
        .count
        .as_deref()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(result.idlist.len() as u64);

    Ok(ESearchHits {
        total_count,
        ids: result.idlist,
    })
}

#[derive(Debug, Deserialize)]
struct ESummaryEnvelope {
    #[serde(default)]
    result: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    esummaryresult: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocSum {
    uid: Option<String>,
    error: Option<String>,
    genes: Vec<GeneRef>,
    chr: Option<String>,
    chrpos: Option<String>,
    chrpos_prev_assm: Option<String>,
    spdi: Option<String>,
    docsum: Option<String>,
    snp_class: Option<String>,
    fxn_class: Option<String>,
    clinical_significance: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneRef {
    name: Option<String>,
}

/// Maps an esummary body to results keyed by bare numeric id. Entries NCBI
/// flags with an `error` (unknown or withdrawn ids) are left out, so callers
/// treat them as not found.
pub fn parse_esummary(body: &str) -> Result<HashMap<String, SnpResult>> {
    let envelope: ESummaryEnvelope = serde_json::from_str(body).map_err(|e| {
        DbSnpError::UpstreamUnavailable(format!("Malformed esummary response: {}", e))
    })?;

    // unresolvable uids come back as a bare esummaryresult message list
    if envelope.result.is_none() && envelope.esummaryresult.iter().any(|m| is_invalid_uid(m)) {
        return Ok(HashMap::new());
    }

    let result = match (envelope.result, envelope.error) {
        (Some(result), _) => result,
        (None, Some(error)) => {
            return Err(DbSnpError::UpstreamUnavailable(format!("esummary error: {}", error)));
        }
        (None, None) => {
            return Err(DbSnpError::UpstreamUnavailable(
                "Malformed esummary response: missing result".to_string(),
            ));
        }
    };

    let mut summaries = HashMap::new();
    for (key, value) in result {
        if key == "uids" {
            continue;
        }

        let doc: DocSum = serde_json::from_value(value).map_err(|e| {
            DbSnpError::UpstreamUnavailable(format!("Malformed document summary for {}: {}", key, e))
        })?;
        if doc.error.is_some() {
            continue;
        }

        let number = doc.uid.clone().unwrap_or(key);
        summaries.insert(number.clone(), doc.into_result(&number));
    }

    Ok(summaries)
}

fn is_invalid_uid(message: &str) -> bool {
    message.to_lowercase().contains("invalid uid")
}

impl DocSum {
    fn into_result(self, number: &str) -> SnpResult {
        let alleles = self
            .docsum
            .as_deref()
            .and_then(alleles_from_docsum)
            .or_else(|| self.spdi.as_deref().and_then(alleles_from_spdi));

        SnpResult {
            rs_id: format!("rs{}", number),
            found: true,
            chromosome: non_empty(self.chr),
            position: self.chrpos.as_deref().and_then(parse_chrpos),
            previous_assembly_position: self.chrpos_prev_assm.as_deref().and_then(parse_chrpos),
            alleles,
            genes: self
                .genes
                .into_iter()
                .filter_map(|g| non_empty(g.name))
                .collect(),
            variant_class: non_empty(self.snp_class),
            functional_classes: split_list(self.fxn_class.as_deref(), |s| s.to_string()),
            clinical_significance: split_list(self.clinical_significance.as_deref(), normalize_label),
            summary: non_empty(self.docsum),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: Option<&str>, map: impl Fn(&str) -> String) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.unwrap_or_default().split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let item = map(item);
        if !items.contains(&item) {
            items.push(item);
        }
    }
    items
}

/// `13:46897343` -> 46897343
fn parse_chrpos(chrpos: &str) -> Option<u64> {
    chrpos
        .rsplit_once(':')
        .and_then(|(_, pos)| pos.trim().parse().ok())
}

/// Pulls `C/A/T` out of a docsum such as `HGVS=...|SEQ=[C/A/T]|LEN=1`.
fn alleles_from_docsum(docsum: &str) -> Option<String> {
    docsum
        .split('|')
        .find_map(|field| field.strip_prefix("SEQ="))
        .map(|seq| seq.trim().trim_start_matches('[').trim_end_matches(']').to_string())
        .filter(|seq| !seq.is_empty())
}

/// Builds `REF/ALT1/ALT2` from comma separated SPDI notations
/// (`NC_000013.11:46897342:C:A,NC_000013.11:46897342:C:T`).
fn alleles_from_spdi(spdi: &str) -> Option<String> {
    let mut alleles: Vec<&str> = Vec::new();
    for notation in spdi.split(',') {
        let parts: Vec<&str> = notation.trim().split(':').collect();
        if parts.len() != 4 {
            continue;
        }
        let (reference, alternate) = (parts[2], parts[3]);
        if alleles.is_empty() {
            alleles.push(if reference.is_empty() { "-" } else { reference });
        }
        let alternate = if alternate.is_empty() { "-" } else { alternate };
        if !alleles.contains(&alternate) {
            alleles.push(alternate);
        }
    }
    (!alleles.is_empty()).then(|| alleles.join("/"))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with_key() -> NcbiConfig {
        NcbiConfig {
            api_key: Some("secret".to_string()),
            email: Some("someone@example.org".to_string()),
            ..NcbiConfig::default()
        }
    }

    #[test]
    fn test_esearch_request() {
        let request = esearch_request(&config_with_key(), "BRCA1", 3);
        assert_eq!(
            request.url,
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"
        );
        assert_eq!(request.query_value("db"), Some("snp"));
        assert_eq!(request.query_value("term"), Some("BRCA1"));
        assert_eq!(request.query_value("retmax"), Some("3"));
        assert_eq!(request.query_value("retmode"), Some("json"));
        assert_eq!(request.query_value("api_key"), Some("secret"));
        assert_eq!(request.query_value("tool"), Some("dbsnp_mcp"));
        assert_eq!(request.query_value("email"), Some("someone@example.org"));
    }

    #[test]
    fn test_esummary_request_without_key() {
        let config = NcbiConfig {
            eutils_base_url: "http://localhost:8080/eutils/".to_string(),
            ..NcbiConfig::default()
        };
        let request = esummary_request(&config, &["6311", "1799966"]);
        assert_eq!(request.url, "http://localhost:8080/eutils/esummary.fcgi");
        assert_eq!(request.query_value("id"), Some("6311,1799966"));
        assert_eq!(request.query_value("api_key"), None);
    }

    #[test]
    fn test_parse_esearch() {
        let hits = parse_esearch(ESEARCH_BRCA1).unwrap();
        assert_eq!(hits.total_count, 1742);
        assert_eq!(hits.ids, vec!["80357906", "6311", "1799966"]);
    }

    #[test]
    fn test_parse_esearch_empty_and_errors() {
        let hits = parse_esearch(r#"{"esearchresult": {"count": "0", "idlist": []}}"#).unwrap();
        assert_eq!(hits.total_count, 0);
        assert!(hits.ids.is_empty());

        assert!(matches!(
            parse_esearch(r#"{"esearchresult": {"ERROR": "Invalid query"}}"#),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            parse_esearch(r#"{"header": {}}"#),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            parse_esearch("<eSearchResult>"),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_esummary_maps_fields() {
        let mut summaries = parse_esummary(ESUMMARY_RS6311).unwrap();
        let result = summaries.remove("6311").unwrap();

        assert_eq!(result.rs_id, "rs6311");
        assert!(result.found);
        assert_eq!(result.chromosome.as_deref(), Some("13"));
        assert_eq!(result.position, Some(46897343));
        assert_eq!(result.previous_assembly_position, Some(47471478));
        assert_eq!(result.alleles.as_deref(), Some("C/A/T"));
        assert_eq!(result.genes, vec!["HTR2A".to_string()]);
        assert_eq!(result.variant_class.as_deref(), Some("snv"));
        assert_eq!(
            result.functional_classes,
            vec![
                "upstream_transcript_variant".to_string(),
                "5_prime_UTR_variant".to_string()
            ]
        );
        assert!(result.clinical_significance.is_empty());
        assert!(result.summary.unwrap().contains("GENE=HTR2A"));
    }

    #[test]
    fn test_parse_esummary_skips_error_entries() {
        let summaries = parse_esummary(ESUMMARY_UNKNOWN).unwrap();
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_parse_esummary_normalizes_clinical_labels() {
        let summaries = parse_esummary(ESUMMARY_BRCA1).unwrap();
        assert_eq!(
            summaries["80357906"].clinical_significance,
            vec!["pathogenic".to_string(), "likely pathogenic".to_string()]
        );
        assert!(summaries["6311"].alleles.is_none());
    }

    #[test]
    fn test_parse_esummary_rejects_malformed() {
        assert!(matches!(
            parse_esummary("{not json"),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            parse_esummary(r#"{"result": {"6311": {"chr": 13}}}"#),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            parse_esummary(r#"{"error": "Invalid uid"}"#),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_esummary_invalid_uid_envelope() {
        assert!(parse_esummary(ESUMMARY_INVALID_UID).unwrap().is_empty());
        assert!(matches!(
            parse_esummary(r#"{"esummaryresult": ["Database is not supported"]}"#),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
    }

    #[test]
    fn test_alleles_from_spdi() {
        assert_eq!(
            alleles_from_spdi("NC_000013.11:46897342:C:A,NC_000013.11:46897342:C:T").as_deref(),
            Some("C/A/T")
        );
        assert_eq!(
            alleles_from_spdi("NC_000017.11:43057062:TC:").as_deref(),
            Some("TC/-")
        );
        assert_eq!(alleles_from_spdi("garbage"), None);
    }

    #[test]
    fn test_parse_chrpos() {
        assert_eq!(parse_chrpos("13:46897343"), Some(46897343));
        assert_eq!(parse_chrpos("X:100"), Some(100));
        assert_eq!(parse_chrpos(""), None);
        assert_eq!(parse_chrpos("13:"), None);
    }
}
