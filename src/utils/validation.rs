// file: src/utils/validation.rs
// description: input validation for tool arguments and configuration values
// reference: https://docs.rs/regex

use crate::error::{DbSnpError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref RS_ID: Regex = Regex::new(r"(?i)^rs([0-9]+)$").expect("RS_ID regex is valid");
}

pub struct Validator;

impl Validator {
    /// Accepts `rs1234` in any case and returns it as lowercase `rs` + digits,
    /// with leading zeros dropped since NCBI keys records by the numeric value.
    pub fn validate_rs_id(raw: &str) -> Result<String> {
        let digits = RS_ID
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                DbSnpError::InvalidArgument(format!(
                    "'{}' is not a valid rs ID (expected 'rs' followed by digits, e.g. rs6311)",
                    raw
                ))
            })?;

        let digits = match digits.trim_start_matches('0') {
            "" => "0",
            stripped => stripped,
        };
        Ok(format!("rs{}", digits))
    }

    pub fn validate_term(term: &str) -> Result<String> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(DbSnpError::InvalidArgument(
                "search term must not be empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Resolves a caller supplied limit: absent means `default`, values above
    /// `max` are clamped, zero and negatives are rejected.
    pub fn validate_limit(limit: Option<i64>, default: usize, max: usize) -> Result<usize> {
        match limit {
            None => Ok(default.min(max)),
            Some(n) if n <= 0 => Err(DbSnpError::InvalidArgument(format!(
                "limit must be a positive integer, got {}",
                n
            ))),
            Some(n) => Ok(usize::try_from(n).unwrap_or(max).min(max)),
        }
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(DbSnpError::InvalidArgument(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((idx, _)) => format!("{}...", &text[..idx]),
        }
    }
}
