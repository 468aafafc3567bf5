// file: src/models/clinical.rs
// description: clinical significance records extracted from RefSNP annotations
// reference: https://api.ncbi.nlm.nih.gov/variation/v0/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_CLINICAL_DATA: &str = "No clinical significance data available";

/// One ClinVar-derived entry attached to an allele.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClinicalAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub significances: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClinicalSignificanceResult {
    pub rs_id: String,
    pub has_data: bool,

    /// classification label -> condition names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub classifications: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ClinicalAnnotation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_into: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClinicalSignificanceResult {
    pub fn no_data(rs_id: impl Into<String>) -> Self {
        Self {
            rs_id: rs_id.into(),
            has_data: false,
            message: Some(NO_CLINICAL_DATA.to_string()),
            ..Default::default()
        }
    }

    /// Groups the annotations by label. Conditions are de-duplicated and sorted.
    pub fn from_annotations(rs_id: impl Into<String>, annotations: Vec<ClinicalAnnotation>) -> Self {
        let mut classifications: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for annotation in &annotations {
            for label in &annotation.significances {
                let conditions = classifications.entry(label.clone()).or_default();
                conditions.extend(annotation.conditions.iter().cloned());
            }
        }
        for conditions in classifications.values_mut() {
            conditions.sort();
            conditions.dedup();
        }

        Self {
            rs_id: rs_id.into(),
            has_data: true,
            classifications,
            annotations,
            ..Default::default()
        }
    }

    pub fn is_pathogenic(&self) -> bool {
        self.classifications
            .keys()
            .any(|label| label == "pathogenic" || label == "likely pathogenic")
    }

    pub fn format_summary(&self) -> String {
        let mut lines = vec![format!("SNP ID: {}", self.rs_id)];
        if !self.merged_into.is_empty() {
            lines.push(format!("  Merged into: {}", self.merged_into.join(", ")));
        }

        if !self.has_data {
            lines.push(format!(
                "  {}",
                self.message.as_deref().unwrap_or(NO_CLINICAL_DATA)
            ));
            return lines.join("\n");
        }

        for (label, conditions) in &self.classifications {
            if conditions.is_empty() {
                lines.push(format!("  {}", label));
            } else {
                lines.push(format!("  {}: {}", label, conditions.join("; ")));
            }
        }
        if let Some(raw) = &self.raw_text {
            lines.push(format!("  Unstructured clinical data: {}", raw));
        }
        lines.join("\n")
    }
}

/// Lowercases a label and turns `-`/`_` separators into spaces, so
/// `Likely-Pathogenic` and `likely_pathogenic` both read `likely pathogenic`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Pathogenic"), "pathogenic");
        assert_eq!(normalize_label("likely-pathogenic"), "likely pathogenic");
        assert_eq!(normalize_label("uncertain_significance"), "uncertain significance");
        assert_eq!(normalize_label("  Likely  Benign "), "likely benign");
    }

    #[test]
    fn test_from_annotations_groups_conditions() {
        let annotations = vec![
            ClinicalAnnotation {
                accession: Some("RCV000001.1".to_string()),
                significances: vec!["pathogenic".to_string()],
                conditions: vec!["Breast-ovarian cancer, familial 1".to_string()],
                review_status: None,
            },
            ClinicalAnnotation {
                accession: Some("RCV000002.1".to_string()),
                significances: vec!["pathogenic".to_string(), "risk factor".to_string()],
                conditions: vec![
                    "Hereditary cancer-predisposing syndrome".to_string(),
                    "Breast-ovarian cancer, familial 1".to_string(),
                ],
                review_status: Some("reviewed by expert panel".to_string()),
            },
        ];

        let result = ClinicalSignificanceResult::from_annotations("rs80357906", annotations);
        assert!(result.has_data);
        assert!(result.is_pathogenic());
        assert_eq!(
            result.classifications.get("pathogenic").unwrap(),
            &vec![
                "Breast-ovarian cancer, familial 1".to_string(),
                "Hereditary cancer-predisposing syndrome".to_string(),
            ]
        );
        assert_eq!(result.classifications.get("risk factor").unwrap().len(), 2);
        assert_eq!(result.annotations.len(), 2);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_no_data() {
        let result = ClinicalSignificanceResult::no_data("rs6311");
        assert!(!result.has_data);
        assert_eq!(result.message.as_deref(), Some(NO_CLINICAL_DATA));
        assert!(result.classifications.is_empty());
        assert!(!result.is_pathogenic());
        assert_eq!(
            result.format_summary(),
            format!("SNP ID: rs6311\n  {}", NO_CLINICAL_DATA)
        );
    }

    #[test]
    fn test_format_summary_lists_classifications() {
        let annotations = vec![ClinicalAnnotation {
            significances: vec!["benign".to_string()],
            conditions: vec!["not specified".to_string(), "not provided".to_string()],
            ..Default::default()
        }];
        let result = ClinicalSignificanceResult::from_annotations("rs6311", annotations);
        assert_eq!(
            result.format_summary(),
            "SNP ID: rs6311\n  benign: not provided; not specified"
        );
    }
}
