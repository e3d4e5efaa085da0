use buildspawn_core::error::CoreError;
use std::collections::HashSet;
use thiserror::Error;

use crate::remote::RemoteBuildingEntry;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate building rdns '{0}'")]
    DuplicateRdns(String),
    #[error("Building pk {pk} has an empty rdns")]
    EmptyRdns { pk: i64 },
    #[error("Building '{rdns}' has invalid geometry: {source}")]
    Geometry { rdns: String, source: CoreError },
    #[error("Building '{rdns}' rule #{index} is invalid: {source}")]
    Rule {
        rdns: String,
        index: usize,
        source: CoreError,
    },
    #[error("Building '{0}' has no spawn rules and will never spawn naturally")]
    NoRules(String),
}

impl ValidationError {
    /// Warnings keep the building in the catalog; everything else drops it.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationError::NoRules(_))
    }
}

/// Validate a remote catalog for constraint compliance.
pub fn validate_entries(
    entries: &[RemoteBuildingEntry],
    default_margin: i32,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.rdns.as_str()) {
            errors.push(ValidationError::DuplicateRdns(entry.rdns.clone()));
        }
    }

    for entry in entries {
        if let Err(e) = entry.to_building(default_margin) {
            errors.push(e);
            continue;
        }
        if entry.rules.is_empty() {
            errors.push(ValidationError::NoRules(entry.rdns.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
