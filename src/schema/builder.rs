//! Two-pass schema ingestion.
//!
//! The first pass creates a node for every class, property and datatype
//! declaration; the second links `subClassOf`, `subPropertyOf`, `domain` and
//! `range` edges and picks up labels. Declaration order in the source never
//! matters for validity, only for the ordinals nodes are given.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SchemaConfig;
use crate::error::{NodeKind, SchemaError};
use crate::iri::Iri;
use crate::schema::{SchemaNode, SchemaRegistry};
use crate::triple::{Term, Triple, TripleSource};
use crate::value::{Datatype, Literal};
use crate::vocab::{self, owl, rdf, rdfs};

/// Builds a [`SchemaRegistry`] from a triple source.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
}

impl SchemaBuilder {
    /// Creates a builder with the given ingestion settings.
    #[must_use]
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    /// Ingests every triple of `source`.
    ///
    /// # Errors
    /// - `DanglingReference`: an edge names a node that is never declared
    /// - `KindMismatch`: an edge (or a double declaration) mixes classes and properties
    /// - `InvalidObject`: an edge's object is a literal
    pub fn ingest<S: TripleSource + ?Sized>(&self, source: &S) -> Result<SchemaRegistry, SchemaError> {
        let triples: Vec<Triple> = source.triples().collect();
        let mut state = Ingest::default();

        for triple in &triples {
            self.declare(&mut state, triple)?;
        }
        tracing::debug!(
            triples = triples.len(),
            nodes = state.nodes.len(),
            datatypes = state.datatypes.len(),
            "schema declarations collected"
        );

        let mut edges = 0usize;
        for triple in &triples {
            if state.link(triple)? {
                edges += 1;
            }
        }
        tracing::debug!(edges, "schema edges linked");

        let nodes = state
            .nodes
            .into_iter()
            .map(|(id, mut node)| {
                node.label = pick_text(state.labels.remove(&id));
                node.comment = pick_text(state.comments.remove(&id));
                (id, node)
            })
            .collect();

        Ok(SchemaRegistry {
            nodes,
            datatypes: state.datatypes,
        })
    }

    fn declaration_kind(&self, class: &str) -> Option<NodeKind> {
        match class {
            rdfs::CLASS => Some(NodeKind::Class),
            rdf::PROPERTY => Some(NodeKind::Property),
            owl::CLASS if self.config.recognize_owl => Some(NodeKind::Class),
            owl::OBJECT_PROPERTY | owl::DATATYPE_PROPERTY | owl::ANNOTATION_PROPERTY
                if self.config.recognize_owl =>
            {
                Some(NodeKind::Property)
            }
            _ => None,
        }
    }

    fn declare(&self, state: &mut Ingest, triple: &Triple) -> Result<(), SchemaError> {
        if triple.predicate != rdf::TYPE {
            return Ok(());
        }
        let Term::Iri(class) = &triple.object else {
            return Ok(());
        };
        if class == rdfs::DATATYPE {
            state.datatypes.insert(triple.subject.clone());
            return Ok(());
        }
        match self.declaration_kind(class.as_str()) {
            Some(kind) => state.declare(&triple.subject, kind, &triple.predicate, class),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct Ingest {
    nodes: BTreeMap<Iri, SchemaNode>,
    datatypes: BTreeSet<Iri>,
    labels: BTreeMap<Iri, Vec<Literal>>,
    comments: BTreeMap<Iri, Vec<Literal>>,
}

impl Ingest {
    fn declare(&mut self, id: &Iri, kind: NodeKind, predicate: &Iri, class: &Iri) -> Result<(), SchemaError> {
        if let Some(existing) = self.nodes.get(id) {
            if existing.kind != kind {
                return Err(SchemaError::KindMismatch {
                    subject: id.clone(),
                    predicate: predicate.clone(),
                    target: class.clone(),
                    expected: existing.kind,
                    found: kind,
                });
            }
            return Ok(());
        }
        let ordinal = self.nodes.len();
        self.nodes.insert(id.clone(), SchemaNode::new(id.clone(), kind, ordinal));
        Ok(())
    }

    /// Builtin annotation properties are valid edge targets without being
    /// declared; they are materialised on first reference.
    fn materialise_builtin(&mut self, id: &Iri) -> bool {
        if self.nodes.contains_key(id) {
            return true;
        }
        let Some(range) = vocab::builtin_property(id.as_str()) else {
            return false;
        };
        let mut node = SchemaNode::new(id.clone(), NodeKind::Property, self.nodes.len());
        if let Some(range) = range {
            node.ranges.insert(Iri::trusted(range));
        }
        self.nodes.insert(id.clone(), node);
        true
    }

    /// Checks that `id` is a declared node of kind `expected`.
    fn expect_node(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        id: &Iri,
        expected: NodeKind,
    ) -> Result<(), SchemaError> {
        if expected == NodeKind::Property {
            self.materialise_builtin(id);
        }
        match self.nodes.get(id) {
            Some(node) if node.kind == expected => Ok(()),
            Some(node) => Err(SchemaError::KindMismatch {
                subject: subject.clone(),
                predicate: predicate.clone(),
                target: id.clone(),
                expected,
                found: node.kind,
            }),
            None => Err(SchemaError::DanglingReference {
                subject: subject.clone(),
                predicate: predicate.clone(),
                target: id.clone(),
            }),
        }
    }

    fn object_iri<'t>(triple: &'t Triple) -> Result<&'t Iri, SchemaError> {
        triple.object.as_iri().ok_or_else(|| SchemaError::InvalidObject {
            subject: triple.subject.clone(),
            predicate: triple.predicate.clone(),
        })
    }

    fn node_mut(&mut self, id: &Iri) -> Result<&mut SchemaNode, SchemaError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SchemaError::DanglingReference {
                subject: id.clone(),
                predicate: Iri::trusted(rdf::TYPE),
                target: id.clone(),
            })
    }

    /// Links one edge. Returns whether the triple was a schema edge.
    fn link(&mut self, triple: &Triple) -> Result<bool, SchemaError> {
        let subject = &triple.subject;
        let predicate = &triple.predicate;

        match predicate.as_str() {
            rdfs::SUB_CLASS_OF => {
                let parent = Self::object_iri(triple)?;
                self.expect_node(subject, predicate, subject, NodeKind::Class)?;
                if vocab::is_universal_class(parent.as_str()) {
                    return Ok(true);
                }
                self.expect_node(subject, predicate, parent, NodeKind::Class)?;
                self.node_mut(subject)?.parents.insert(parent.clone());
            }
            rdfs::SUB_PROPERTY_OF => {
                let parent = Self::object_iri(triple)?;
                self.expect_node(subject, predicate, subject, NodeKind::Property)?;
                self.expect_node(subject, predicate, parent, NodeKind::Property)?;
                self.node_mut(subject)?.parents.insert(parent.clone());
            }
            rdfs::DOMAIN => {
                let domain = Self::object_iri(triple)?;
                self.expect_node(subject, predicate, subject, NodeKind::Property)?;
                if !vocab::is_universal_class(domain.as_str()) {
                    self.expect_node(subject, predicate, domain, NodeKind::Class)?;
                }
                self.node_mut(subject)?.domains.insert(domain.clone());
            }
            rdfs::RANGE => {
                let range = Self::object_iri(triple)?;
                self.expect_node(subject, predicate, subject, NodeKind::Property)?;
                let is_datatype = Datatype::from_iri(range.as_str()).is_some()
                    || self.datatypes.contains(range);
                if !is_datatype && !vocab::is_universal_class(range.as_str()) {
                    self.expect_node(subject, predicate, range, NodeKind::Class)?;
                }
                self.node_mut(subject)?.ranges.insert(range.clone());
            }
            rdfs::LABEL | rdfs::COMMENT => {
                let (Some(literal), true) = (triple.object.as_literal(), self.nodes.contains_key(subject)) else {
                    return Ok(false);
                };
                let texts = if predicate == rdfs::LABEL {
                    &mut self.labels
                } else {
                    &mut self.comments
                };
                texts.entry(subject.clone()).or_default().push(literal.clone());
                return Ok(false);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Picks one text deterministically: untagged first, then English, then the
/// smallest by language and text.
fn pick_text(candidates: Option<Vec<Literal>>) -> Option<String> {
    candidates?
        .into_iter()
        .min_by_key(|literal| {
            let rank = match literal.language() {
                None => 0,
                Some(lang) if lang == "en" || lang.starts_with("en-") => 1,
                Some(_) => 2,
            };
            (rank, literal.language().map(str::to_string), literal.lexical())
        })
        .map(|literal| literal.lexical())
}
