//! Error types for ontoledger.
//!
//! All errors are strongly typed using thiserror. Schema errors are fatal to
//! the load that raised them; validation errors are local to a single call and
//! leave every other piece of state untouched.

use std::fmt;

use thiserror::Error;

use crate::iri::Iri;

/// The two kinds of schema node that can carry parent edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An `rdfs:Class` (or `owl:Class`) declaration.
    Class,
    /// An `rdf:Property` (or OWL property) declaration.
    Property,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Property => write!(f, "property"),
        }
    }
}

/// Failures while turning triples into a schema and synthesizing types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("`{subject}` {predicate} `{target}`, but `{target}` is never declared")]
    DanglingReference {
        subject: Iri,
        predicate: Iri,
        target: Iri,
    },

    #[error("`{subject}` {predicate} `{target}` links a {found} where a {expected} is required")]
    KindMismatch {
        subject: Iri,
        predicate: Iri,
        target: Iri,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("cyclic {kind} inheritance: {}", format_cycle(.members))]
    CyclicInheritance {
        kind: NodeKind,
        members: Vec<Iri>,
    },

    #[error("`{subject}` {predicate} expects a resource, found a literal")]
    InvalidObject {
        subject: Iri,
        predicate: Iri,
    },
}

fn format_cycle(members: &[Iri]) -> String {
    let mut out = members
        .iter()
        .map(Iri::as_str)
        .collect::<Vec<_>>()
        .join(" -> ");
    if let Some(first) = members.first() {
        out.push_str(" -> ");
        out.push_str(first.as_str());
    }
    out
}

/// Per-call validation errors raised by the instance surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value {found} is outside the range of `{property}` (expected {expected})")]
    RangeMismatch {
        property: Iri,
        expected: String,
        found: String,
    },

    #[error("type `{class}` has no property `{property}`")]
    UnknownProperty {
        class: Iri,
        property: String,
    },

    #[error("no class named `{class}` in this ontology")]
    UnknownClass {
        class: String,
    },

    #[error("instance `{instance}` is not known to this ledger")]
    UnknownInstance {
        instance: Iri,
    },

    #[error("instance `{instance}` is already recorded in this ledger")]
    DuplicateInstance {
        instance: Iri,
    },

    #[error("invalid language tag '{tag}'")]
    InvalidLanguageTag {
        tag: String,
    },

    #[error("{value} cannot carry a language tag")]
    UntaggableValue {
        value: String,
    },

    #[error("instance `{instance}` is typed with unrelated classes: {types:?}")]
    ConflictingTypes {
        instance: Iri,
        types: Vec<Iri>,
    },
}

/// Errors converting external RDF terms into crate terms.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TermError {
    #[error("invalid IRI: {value}")]
    InvalidIri {
        value: String,
    },

    #[error("unsupported RDF term in {position} position: {term}")]
    UnsupportedTerm {
        position: &'static str,
        term: String,
    },
}

/// Top-level error type for ontoledger.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Term error: {0}")]
    Term(#[from] TermError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl OntologyError {
    /// Returns true if this is a schema error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a term conversion error.
    #[must_use]
    pub const fn is_term(&self) -> bool {
        matches!(self, Self::Term(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias for ontoledger operations.
pub type OntologyResult<T> = Result<T, OntologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_cycle_error_names_members() {
        let err = SchemaError::CyclicInheritance {
            kind: NodeKind::Class,
            members: vec![iri("http://ex.org/A"), iri("http://ex.org/B")],
        };
        let msg = format!("{err}");
        assert!(msg.contains("cyclic class inheritance"));
        assert!(msg.contains("http://ex.org/A -> http://ex.org/B -> http://ex.org/A"));
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = SchemaError::KindMismatch {
            subject: iri("http://ex.org/A"),
            predicate: iri("http://www.w3.org/2000/01/rdf-schema#subClassOf"),
            target: iri("http://ex.org/p"),
            expected: NodeKind::Class,
            found: NodeKind::Property,
        };
        let msg = format!("{err}");
        assert!(msg.contains("links a property where a class is required"));
    }

    #[test]
    fn test_range_mismatch_message() {
        let err = ValidationError::RangeMismatch {
            property: iri("http://ex.org/officialLanguage"),
            expected: "instance of <http://ex.org/Language>".to_string(),
            found: "instance of <http://ex.org/Currency>".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("officialLanguage"));
        assert!(msg.contains("Currency"));
    }

    #[test]
    fn test_ontology_error_from_schema() {
        let err: OntologyError = SchemaError::InvalidObject {
            subject: iri("http://ex.org/A"),
            predicate: iri("http://ex.org/p"),
        }
        .into();
        assert!(err.is_schema());
        assert!(!err.is_validation());
        assert!(!err.is_config());
    }

    #[test]
    fn test_ontology_error_from_validation() {
        let err: OntologyError = ValidationError::UnknownClass {
            class: "Planet".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_term());
        assert!(format!("{err}").contains("Planet"));
    }
}
