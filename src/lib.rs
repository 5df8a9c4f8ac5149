//! # ontoledger - RDF/RDFS ontologies as live object models
//!
//! ontoledger turns the classes and properties declared by an RDFS ontology
//! into synthesized types that can be instantiated, assigned to and queried,
//! and keeps a ledger of every instance so the whole object graph can be
//! streamed back out as statements.
//!
//! ## Core Concepts
//!
//! - **Schema registry**: one node per declared class or property with its
//!   direct parents, domains and ranges
//! - **Synthesized type**: a class with its ancestor closure and every
//!   property it can use, inherited ones included
//! - **Property spec**: a property with its domain and range resolved up the
//!   subproperty chain
//! - **Instance**: an object of a synthesized type holding multi-valued,
//!   range-checked, optionally language-tagged property values
//! - **Session ledger**: records types and instances and exports them as
//!   statements
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ontoledger::{Ontology, OntologyConfig, SessionLedger};
//!
//! // Triples come from any `TripleSource`, e.g. an `oxrdf::Graph`
//! let ledger = SessionLedger::new();
//! let geo = Ontology::load_in(&graph, &OntologyConfig::default(), &ledger)?;
//!
//! let mandarin = geo.instantiate("Language")?.build_in(&ledger)?;
//! let china = geo
//!     .instantiate("Country")?
//!     .with("officialLanguage", &mandarin)
//!     .with_lang("label", "Chine", "fr")
//!     .build_in(&ledger)?;
//!
//! assert!(china.contains("officialLanguage", &mandarin)?);
//!
//! for statement in &ledger.statements() {
//!     println!("{statement}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Values and terms
pub mod error;
pub mod iri;
pub mod triple;
pub mod value;
pub mod vocab;

// Schema and types
pub mod config;
pub mod ontology;
pub mod schema;
pub mod synthesis;

// Instances and sessions
pub mod instance;
pub mod session;

// Re-export primary types at crate root for convenience
pub use config::{ExportConfig, OntologyConfig, SchemaConfig, SynthesisConfig};
pub use error::{NodeKind, OntologyError, OntologyResult, SchemaError, TermError, ValidationError};
pub use instance::{Instance, InstanceBuilder, PropertyAccess, ValueSet};
pub use iri::Iri;
pub use ontology::Ontology;
pub use schema::{SchemaBuilder, SchemaNode, SchemaRegistry};
pub use session::{with_scope, SessionLedger, SessionScope, Statement, StatementIter, Statements};
pub use synthesis::{PropertySpec, RangeConstraint, SynthesizedSchema, SynthesizedType, Synthesizer};
pub use triple::{Term, Triple, TripleSource};
pub use value::{Datatype, InstanceRef, Literal, LiteralValue, Value};
