// file: src/client/variation.rs
// description: Variation Services refsnp request and clinical annotation extraction
// reference: https://api.ncbi.nlm.nih.gov/variation/v0/

use crate::client::transport::HttpRequest;
use crate::config::NcbiConfig;
use crate::error::{DbSnpError, Result};
use crate::models::clinical::normalize_label;
use crate::models::{ClinicalAnnotation, ClinicalSignificanceResult, RsId};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub fn refsnp_request(config: &NcbiConfig, id: &RsId) -> HttpRequest {
    let url = format!(
        "{}/refsnp/{}",
        config.variation_base_url.trim_end_matches('/'),
        id.number()
    );
    let mut request = HttpRequest::get(url);
    if let Some(key) = &config.api_key {
        request = request.header("api-key", key.as_str());
    }
    request
}

#[derive(Debug, Deserialize)]
struct RefSnp {
    #[serde(default)]
    refsnp_id: Option<Value>,
    #[serde(default)]
    primary_snapshot_data: Option<PrimarySnapshot>,
    #[serde(default)]
    merged_snapshot_data: Option<MergedSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrimarySnapshot {
    allele_annotations: Vec<AlleleAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlleleAnnotation {
    clinical: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MergedSnapshot {
    merged_into: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClinicalEntry {
    accession_version: Option<String>,
    accession: Option<String>,
    clinical_significances: Vec<String>,
    clinical_significance: Option<String>,
    disease_names: Vec<DiseaseName>,
    review_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiseaseName {
    Text(String),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

impl ClinicalEntry {
    /// `None` when the entry carries no usable significance label.
    fn into_annotation(self) -> Option<ClinicalAnnotation> {
        let mut significances: Vec<String> = Vec::new();
        let labels = self
            .clinical_significances
            .iter()
            .map(String::as_str)
            .chain(self.clinical_significance.as_deref().into_iter().flat_map(|s| s.split(',')));
        for label in labels {
            let label = normalize_label(label);
            if !label.is_empty() && !significances.contains(&label) {
                significances.push(label);
            }
        }
        if significances.is_empty() {
            return None;
        }

        let conditions = self
            .disease_names
            .into_iter()
            .filter_map(|d| match d {
                DiseaseName::Text(name) => Some(name),
                DiseaseName::Named { name } => name,
            })
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Some(ClinicalAnnotation {
            accession: self.accession_version.or(self.accession),
            significances,
            conditions,
            review_status: self.review_status.map(|s| normalize_label(&s)),
        })
    }
}

/// Extracts clinical annotations from a full RefSNP record.
pub fn parse_refsnp(body: &str, id: &RsId) -> Result<ClinicalSignificanceResult> {
    let refsnp: RefSnp = serde_json::from_str(body)
        .map_err(|e| DbSnpError::UpstreamUnavailable(format!("Malformed refsnp response: {}", e)))?;

    if refsnp.refsnp_id.is_none() {
        return Err(DbSnpError::UpstreamUnavailable(
            "Malformed refsnp response: missing refsnp_id".to_string(),
        ));
    }

    let merged_into: Vec<String> = refsnp
        .merged_snapshot_data
        .map(|m| m.merged_into)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .map(|n| format!("rs{}", n.trim_start_matches("rs")))
        .collect();

    let entries: Vec<Value> = refsnp
        .primary_snapshot_data
        .map(|p| p.allele_annotations)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|a| a.clinical)
        .collect();

    debug!("{}: {} clinical entries", id, entries.len());

    let mut result = if entries.is_empty() {
        ClinicalSignificanceResult::no_data(id.as_str())
    } else {
        let mut annotations: Vec<ClinicalAnnotation> = Vec::new();
        for entry in &entries {
            let annotation = serde_json::from_value::<ClinicalEntry>(entry.clone())
                .ok()
                .and_then(ClinicalEntry::into_annotation);
            if let Some(annotation) = annotation {
                if !annotations.contains(&annotation) {
                    annotations.push(annotation);
                }
            }
        }

        if annotations.is_empty() {
            ClinicalSignificanceResult {
                rs_id: id.to_string(),
                has_data: true,
                raw_text: Some(Value::Array(entries).to_string()),
                ..Default::default()
            }
        } else {
            ClinicalSignificanceResult::from_annotations(id.as_str(), annotations)
        }
    };

    result.merged_into = merged_into;
    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::NO_CLINICAL_DATA;
    use pretty_assertions::assert_eq;

    fn rs(raw: &str) -> RsId {
        RsId::parse(raw).unwrap()
    }

    #[test]
    fn test_refsnp_request() {
        let config = NcbiConfig {
            api_key: Some("secret".to_string()),
            ..NcbiConfig::default()
        };
        let request = refsnp_request(&config, &rs("RS6311"));
        assert_eq!(
            request.url,
            "https://api.ncbi.nlm.nih.gov/variation/v0/refsnp/6311"
        );
        assert_eq!(request.header_value("api-key"), Some("secret"));

        let request = refsnp_request(&NcbiConfig::default(), &rs("rs6311"));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_parse_pathogenic_record() {
        let result = parse_refsnp(REFSNP_PATHOGENIC, &rs("rs80357906")).unwrap();

        assert!(result.has_data);
        assert_eq!(result.rs_id, "rs80357906");
        assert_eq!(result.annotations.len(), 2);
        assert_eq!(
            result.annotations[0].accession.as_deref(),
            Some("RCV000031208.30")
        );
        assert_eq!(
            result.annotations[0].review_status.as_deref(),
            Some("reviewed by expert panel")
        );
        assert_eq!(
            result.classifications["pathogenic"],
            vec![
                "Breast-ovarian cancer, familial 1".to_string(),
                "Hereditary cancer-predisposing syndrome".to_string()
            ]
        );
        assert!(result.classifications.contains_key("likely pathogenic"));
        assert!(result.raw_text.is_none());
        assert!(result.message.is_none());
    }

    #[test]
    fn test_parse_without_clinical_data() {
        let result = parse_refsnp(REFSNP_NO_CLINICAL, &rs("rs397507444")).unwrap();
        assert!(!result.has_data);
        assert_eq!(result.message.as_deref(), Some(NO_CLINICAL_DATA));
        assert!(result.classifications.is_empty());
    }

    #[test]
    fn test_parse_unstructured_entries_fall_back_to_raw_text() {
        let result = parse_refsnp(REFSNP_UNSTRUCTURED, &rs("rs1")).unwrap();
        assert!(result.has_data);
        assert!(result.classifications.is_empty());
        assert!(result.raw_text.unwrap().contains("see ClinVar"));
    }

    #[test]
    fn test_parse_merged_record() {
        let result = parse_refsnp(REFSNP_MERGED, &rs("rs59296319")).unwrap();
        assert!(!result.has_data);
        assert_eq!(result.merged_into, vec!["rs6311".to_string()]);
    }

    #[test]
    fn test_legacy_field_shapes() {
        let body = r#"{
            "refsnp_id": "42",
            "primary_snapshot_data": {"allele_annotations": [{"clinical": [{
                "accession": "RCV0001",
                "clinical_significance": "Benign, Likely_benign",
                "disease_names": [{"name": "not specified"}, {"id": 3}]
            }]}]}
        }"#;
        let result = parse_refsnp(body, &rs("rs42")).unwrap();
        assert_eq!(
            result.annotations[0].significances,
            vec!["benign".to_string(), "likely benign".to_string()]
        );
        assert_eq!(result.classifications["benign"], vec!["not specified".to_string()]);
        assert_eq!(result.annotations[0].accession.as_deref(), Some("RCV0001"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_refsnp("<html>Service Unavailable</html>", &rs("rs1")),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            parse_refsnp("{}", &rs("rs1")),
            Err(DbSnpError::UpstreamUnavailable(_))
        ));
    }
}
