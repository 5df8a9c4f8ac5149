//! Loader configuration.
//!
//! Every section has sensible defaults, so `OntologyConfig::default()` is the
//! usual starting point; JSON documents may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::OntologyResult;

/// Controls which declarations the schema builder recognises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Treat `owl:Class` and the OWL property classes as declarations.
    pub recognize_owl: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { recognize_owl: true }
    }
}

/// Controls the shape of synthesized types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Expose `rdfs:label`, `rdfs:comment`, `rdfs:seeAlso`,
    /// `rdfs:isDefinedBy` and `rdf:value` on every type.
    pub builtin_properties: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            builtin_properties: true,
        }
    }
}

/// Controls statement export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Emit `(instance, rdf:type, class)` ahead of each instance's values.
    pub include_type_statements: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_type_statements: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    /// Schema ingestion settings.
    pub schema: SchemaConfig,
    /// Type synthesis settings.
    pub synthesis: SynthesisConfig,
    /// Statement export settings.
    pub export: ExportConfig,
}

impl OntologyConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> OntologyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
