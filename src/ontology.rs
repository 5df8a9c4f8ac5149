//! The loaded ontology: schema registry plus synthesized types.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::OntologyConfig;
use crate::error::{SchemaError, ValidationError};
use crate::instance::{Instance, InstanceBuilder};
use crate::iri::Iri;
use crate::schema::{SchemaBuilder, SchemaRegistry};
use crate::session::{SessionLedger, Statement, Statements};
use crate::synthesis::{PropertySpec, SynthesizedSchema, SynthesizedType, Synthesizer};
use crate::triple::{Term, TripleSource};
use crate::value::Value;
use crate::vocab::rdf;

/// A loaded ontology.
///
/// Loading runs to completion before any instance can be constructed: the
/// schema is ingested, every type is synthesized, and only then is an
/// `Ontology` handed out. Any schema error aborts the whole load.
#[derive(Debug, Clone)]
pub struct Ontology {
    registry: SchemaRegistry,
    schema: SynthesizedSchema,
    config: OntologyConfig,
}

impl Ontology {
    /// Loads an ontology, recording its types in the current ledger.
    pub fn load<S: TripleSource + ?Sized>(source: &S, config: &OntologyConfig) -> Result<Self, SchemaError> {
        Self::load_in(source, config, &SessionLedger::current())
    }

    /// Loads an ontology, recording its types in `ledger`.
    pub fn load_in<S: TripleSource + ?Sized>(
        source: &S,
        config: &OntologyConfig,
        ledger: &SessionLedger,
    ) -> Result<Self, SchemaError> {
        let registry = SchemaBuilder::new(config.schema.clone()).ingest(source)?;
        let schema = Synthesizer::new(config.synthesis.clone()).synthesize_in(&registry, ledger)?;
        Ok(Self {
            registry,
            schema,
            config: config.clone(),
        })
    }

    /// The ingested schema graph.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Returns the synthesized schema.
    #[must_use]
    pub fn schema(&self) -> &SynthesizedSchema {
        &self.schema
    }

    /// Returns the settings the ontology was loaded with.
    #[must_use]
    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    /// Looks up a type by display name or IRI.
    ///
    /// # Errors
    /// `UnknownClass` if no class matches.
    pub fn class(&self, name_or_iri: &str) -> Result<&Arc<SynthesizedType>, ValidationError> {
        self.schema
            .class(name_or_iri)
            .ok_or_else(|| ValidationError::UnknownClass {
                class: name_or_iri.to_string(),
            })
    }

    /// Looks up a resolved property by display name or IRI.
    #[must_use]
    pub fn property(&self, name_or_iri: &str) -> Option<&Arc<PropertySpec>> {
        self.schema.property(name_or_iri)
    }

    /// Every synthesized type, in class declaration order.
    #[must_use]
    pub fn types(&self) -> &[Arc<SynthesizedType>] {
        self.schema.types()
    }

    /// Starts building an instance of `class`.
    pub fn instantiate(&self, class: &str) -> Result<InstanceBuilder, ValidationError> {
        self.class(class).map(|ty| InstanceBuilder::new(Arc::clone(ty)))
    }

    /// Exports `ledger` with this ontology's export settings.
    #[must_use]
    pub fn export(&self, ledger: &SessionLedger) -> Statements {
        ledger.statements_with(self.config.export)
    }

    /// Re-ingests exported statements into `ledger`.
    ///
    /// Each `rdf:type` statement naming a class of this ontology creates an
    /// instance with the statement's subject as identifier; a subject typed
    /// more than once takes its most specific type. Every other statement
    /// becomes an assignment on one of those instances, and IRI objects that
    /// name a replayed or already recorded instance become instance
    /// references.
    ///
    /// Nothing is recorded unless every statement validates.
    ///
    /// # Errors
    /// - `UnknownClass`: an `rdf:type` object is not a class of this ontology
    /// - `ConflictingTypes`: a subject's types are not on one inheritance line
    /// - `UnknownInstance`: a statement's subject has no `rdf:type` statement
    /// - `DuplicateInstance`: the ledger already holds a replayed identifier
    /// - any error an assignment can raise
    pub fn replay<I>(&self, statements: I, ledger: &SessionLedger) -> Result<Vec<Arc<Instance>>, ValidationError>
    where
        I: IntoIterator<Item = Statement>,
    {
        let mut typed: Vec<(Iri, Vec<Arc<SynthesizedType>>)> = Vec::new();
        let mut typed_index: HashMap<Iri, usize> = HashMap::new();
        let mut assertions: Vec<Statement> = Vec::new();

        for statement in statements {
            let type_object = match &statement.object {
                Term::Iri(class) if statement.predicate == rdf::TYPE => Some(class.as_str().to_string()),
                _ => None,
            };
            match type_object {
                Some(class) => {
                    let ty = Arc::clone(self.class(&class)?);
                    let idx = *typed_index.entry(statement.subject.clone()).or_insert_with(|| {
                        typed.push((statement.subject.clone(), Vec::new()));
                        typed.len() - 1
                    });
                    typed[idx].1.push(ty);
                }
                None => assertions.push(statement),
            }
        }

        let mut instances: Vec<Arc<Instance>> = Vec::with_capacity(typed.len());
        for (id, types) in typed {
            if ledger.instance(&id).is_some() {
                return Err(ValidationError::DuplicateInstance { instance: id });
            }
            let class = most_specific(&id, types)?;
            instances.push(InstanceBuilder::new(class).id(id).build_detached()?);
        }

        for statement in assertions {
            let subject = typed_index
                .get(&statement.subject)
                .map(|idx| &instances[*idx])
                .ok_or_else(|| ValidationError::UnknownInstance {
                    instance: statement.subject.clone(),
                })?;
            let value = match statement.object {
                Term::Literal(literal) => Value::Literal(literal),
                Term::Iri(iri) => match typed_index.get(&iri) {
                    Some(idx) => Value::Instance(instances[*idx].reference()),
                    None => ledger
                        .instance(&iri)
                        .map_or(Value::Resource(iri), |known| Value::Instance(known.reference())),
                },
            };
            subject.assign(statement.predicate.as_str(), value)?;
        }

        ledger.record_instances(&instances)?;
        tracing::debug!(ledger = %ledger.id(), instances = instances.len(), "statements replayed");
        Ok(instances)
    }
}

/// Picks the type every other candidate is an ancestor of.
fn most_specific(id: &Iri, types: Vec<Arc<SynthesizedType>>) -> Result<Arc<SynthesizedType>, ValidationError> {
    types
        .iter()
        .find(|candidate| types.iter().all(|other| candidate.is_a(other.id())))
        .cloned()
        .ok_or_else(|| ValidationError::ConflictingTypes {
            instance: id.clone(),
            types: types.iter().map(|ty| ty.id().clone()).collect(),
        })
}
