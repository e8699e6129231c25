//! Case classification of negation wiring.
//!
//! A negation is realized either through a connector (Case I) or through a
//! direct connection (Case II). Case II applies exactly when the function
//! mapping of the source port names a destination parameter with a numeric id;
//! that id then locates the port in the diagram. Without a mapping the id is
//! recovered from the generated-artifact table, or falls back to
//! [`DEFAULT_TARGET_ID`].

use crate::data::FunctionMapping;
use crate::error::SourceError;
use crate::parsing::first_digit_run;
use crate::source::RelationalSource;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

/// Last-resort port id when neither a mapping nor a generated-artifact row resolves one.
pub const DEFAULT_TARGET_ID: &str = "10";

/// Where a Case I target id came from.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetIdOrigin {
    GeneratedArtifact,
    Default,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum CaseClassification {
    /// Case I: connector-based wiring.
    Connector {
        target_id: String,
        origin: TargetIdOrigin,
    },
    /// Case II: direct-connection wiring.
    DirectConnection { target_id: String },
    /// A mapping exists but its destination parameter carries no digits.
    Unresolved { dest_param_id: Option<String> },
    /// Several rows disagree on the target id.
    Ambiguous { candidates: Vec<String> },
}

impl CaseClassification {
    pub fn is_case_ii(&self) -> bool {
        matches!(self, CaseClassification::DirectConnection { .. })
    }

    pub fn target_numeric_id(&self) -> Option<&str> {
        match self {
            CaseClassification::Connector { target_id, .. }
            | CaseClassification::DirectConnection { target_id } => Some(target_id),
            CaseClassification::Unresolved { .. } | CaseClassification::Ambiguous { .. } => None,
        }
    }
}

impl fmt::Display for CaseClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseClassification::Connector { target_id, origin } => {
                write!(f, "Case I (id {} from {:?})", target_id, origin)
            }
            CaseClassification::DirectConnection { target_id } => {
                write!(f, "Case II (id {})", target_id)
            }
            CaseClassification::Unresolved { dest_param_id } => write!(
                f,
                "unresolved (dest_param_id {})",
                dest_param_id.as_deref().unwrap_or("<null>")
            ),
            CaseClassification::Ambiguous { candidates } => {
                write!(f, "ambiguous [{}]", candidates.join(", "))
            }
        }
    }
}

/// Classifies from the mapping rows found for the source port.
///
/// Rows are grouped by the id they yield; more than one distinct id is ambiguous
/// and names every row's `dest_param_id`. Callers take the fallback path instead
/// when no row exists.
pub fn classify_mappings(mappings: &[FunctionMapping]) -> CaseClassification {
    let distinct: Vec<&FunctionMapping> = mappings
        .iter()
        .unique_by(|m| target_id_of(m))
        .collect();

    match distinct.as_slice() {
        [] => CaseClassification::Unresolved {
            dest_param_id: None,
        },
        [mapping] => match target_id_of(mapping) {
            Some(target_id) => CaseClassification::DirectConnection { target_id },
            None => CaseClassification::Unresolved {
                dest_param_id: mapping.dest_param_id.clone(),
            },
        },
        _ => CaseClassification::Ambiguous {
            candidates: mappings
                .iter()
                .map(|m| m.dest_param_id.clone().unwrap_or_else(|| "<null>".to_string()))
                .unique()
                .collect(),
        },
    }
}

fn target_id_of(mapping: &FunctionMapping) -> Option<String> {
    mapping
        .dest_param_id
        .as_deref()
        .and_then(first_digit_run)
        .map(str::to_string)
}

/// Classifies from `temp_generated_artifact` ports when no mapping exists.
/// Always Case I; ports without digits fall through to the default id.
pub fn classify_generated_ports(ports: &[String]) -> CaseClassification {
    let ids: Vec<&str> = ports
        .iter()
        .filter_map(|port| first_digit_run(port))
        .unique()
        .collect();

    match ids.as_slice() {
        [] => CaseClassification::Connector {
            target_id: DEFAULT_TARGET_ID.to_string(),
            origin: TargetIdOrigin::Default,
        },
        [id] => CaseClassification::Connector {
            target_id: id.to_string(),
            origin: TargetIdOrigin::GeneratedArtifact,
        },
        _ => CaseClassification::Ambiguous {
            candidates: ports
                .iter()
                .filter(|port| first_digit_run(port).is_some())
                .cloned()
                .collect(),
        },
    }
}

/// What the classifier needs to know about one connection.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRequest<'a> {
    /// Declared type of the owning block, if known.
    pub block_type: Option<&'a str>,
    /// Source port id parsed from the interconnection.
    pub source_port_id: &'a str,
    pub block: &'a str,
    pub port_name: &'a str,
}

/// Reads mapping and fallback rows and classifies. Holds no state between calls.
pub struct CaseClassifier<'a> {
    source: &'a dyn RelationalSource,
}

impl<'a> CaseClassifier<'a> {
    pub fn new(source: &'a dyn RelationalSource) -> Self {
        Self { source }
    }

    pub fn classify(
        &self,
        request: &ClassificationRequest<'_>,
    ) -> Result<CaseClassification, SourceError> {
        if let Some(block_type) = request.block_type {
            let mappings = self
                .source
                .mappings_by_port(block_type, request.source_port_id)?;
            if !mappings.is_empty() {
                return Ok(classify_mappings(&mappings));
            }
        }
        let ports = self
            .source
            .generated_ports(request.block, request.port_name)?;
        Ok(classify_generated_ports(&ports))
    }
}
