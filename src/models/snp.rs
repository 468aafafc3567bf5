// file: src/models/snp.rs
// description: flat SNP records returned by lookup and search
// reference: https://www.ncbi.nlm.nih.gov/books/NBK25499/#chapter4.ESummary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnpResult {
    pub rs_id: String,

    /// False when NCBI answered but has no record for this id.
    pub found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chromosome: Option<String>,

    /// GRCh38 position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,

    /// GRCh37 position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_assembly_position: Option<u64>,

    /// Reference first, then alternates, e.g. `C/A/T`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alleles: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_class: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_classes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clinical_significance: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl SnpResult {
    pub fn not_found(rs_id: impl Into<String>) -> Self {
        Self {
            rs_id: rs_id.into(),
            found: false,
            ..Default::default()
        }
    }

    /// A hit known only by id, without a fetched summary.
    pub fn id_only(rs_id: impl Into<String>) -> Self {
        Self {
            rs_id: rs_id.into(),
            found: true,
            ..Default::default()
        }
    }

    /// Format as a readable block for terminal output
    pub fn format_summary(&self) -> String {
        if !self.found {
            return format!("SNP ID: {} (not found in dbSNP)", self.rs_id);
        }

        let unspecified = || "Not specified".to_string();
        let mut lines = vec![
            format!("SNP ID: {}", self.rs_id),
            format!(
                "  Chromosome: {}",
                self.chromosome.clone().unwrap_or_else(unspecified)
            ),
            format!(
                "  Position (GRCh38): {}",
                self.position.map(|p| p.to_string()).unwrap_or_else(unspecified)
            ),
        ];
        if let Some(position) = self.previous_assembly_position {
            lines.push(format!("  Position (GRCh37): {}", position));
        }
        lines.push(format!(
            "  Alleles: {}",
            self.alleles.clone().unwrap_or_else(unspecified)
        ));
        lines.push(format!(
            "  Gene: {}",
            if self.genes.is_empty() {
                unspecified()
            } else {
                self.genes.join(", ")
            }
        ));
        if let Some(class) = &self.variant_class {
            lines.push(format!("  Class: {}", class));
        }
        if !self.functional_classes.is_empty() {
            lines.push(format!("  Function: {}", self.functional_classes.join(", ")));
        }
        if !self.clinical_significance.is_empty() {
            lines.push(format!(
                "  Clinical significance: {}",
                self.clinical_significance.join(", ")
            ));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpSearchResults {
    pub term: String,

    /// Total hits reported upstream, may exceed `results.len()`
    pub total_count: u64,

    /// Upstream relevance order
    pub results: Vec<SnpResult>,
}

impl SnpSearchResults {
    pub fn returned_count(&self) -> usize {
        self.results.len()
    }

    pub fn format_summary(&self) -> String {
        if self.results.is_empty() {
            return format!("No SNP information found for query: {}", self.term);
        }

        let blocks: Vec<String> = self.results.iter().map(SnpResult::format_summary).collect();
        format!(
            "Found {} matching SNPs for '{}'. Showing first {}:\n\n{}",
            self.total_count,
            self.term,
            self.returned_count(),
            blocks.join("\n\n==========\n\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_serializes_without_optional_fields() {
        let result = SnpResult::not_found("rs1");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "rs_id": "rs1", "found": false }));
    }

    #[test]
    fn test_format_summary() {
        let result = SnpResult {
            rs_id: "rs6311".to_string(),
            found: true,
            chromosome: Some("13".to_string()),
            position: Some(46897343),
            alleles: Some("C/A/T".to_string()),
            genes: vec!["HTR2A".to_string()],
            ..Default::default()
        };

        let summary = result.format_summary();
        assert!(summary.starts_with("SNP ID: rs6311"));
        assert!(summary.contains("Position (GRCh38): 46897343"));
        assert!(summary.contains("Gene: HTR2A"));
        assert!(!summary.contains("GRCh37"));

        let missing = SnpResult::not_found("rs1").format_summary();
        assert!(missing.contains("not found"));
    }

    #[test]
    fn test_search_format_summary() {
        let empty = SnpSearchResults {
            term: "zzz".to_string(),
            total_count: 0,
            results: vec![],
        };
        assert_eq!(empty.format_summary(), "No SNP information found for query: zzz");

        let results = SnpSearchResults {
            term: "HTR2A".to_string(),
            total_count: 120,
            results: vec![SnpResult::id_only("rs6311"), SnpResult::id_only("rs6313")],
        };
        let summary = results.format_summary();
        assert!(summary.starts_with("Found 120 matching SNPs for 'HTR2A'. Showing first 2"));
        assert!(summary.contains("=========="));
    }

    #[test]
    fn test_id_only() {
        let result = SnpResult::id_only("rs6311");
        assert!(result.found);
        assert!(result.genes.is_empty());
        assert!(result.position.is_none());
    }
}
