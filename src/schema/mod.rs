//! Schema nodes and the registry the builder produces.
//!
//! A [`SchemaRegistry`] is the validated, immutable view of an ontology's
//! classes and properties before any type is synthesized from it.

mod builder;

use std::collections::{BTreeMap, BTreeSet};

pub use builder::SchemaBuilder;

use crate::error::NodeKind;
use crate::iri::Iri;
use crate::value::Datatype;

/// One declared class or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    id: Iri,
    kind: NodeKind,
    label: Option<String>,
    comment: Option<String>,
    parents: BTreeSet<Iri>,
    domains: BTreeSet<Iri>,
    ranges: BTreeSet<Iri>,
    ordinal: usize,
}

impl SchemaNode {
    pub(crate) fn new(id: Iri, kind: NodeKind, ordinal: usize) -> Self {
        Self {
            id,
            kind,
            label: None,
            comment: None,
            parents: BTreeSet::new(),
            domains: BTreeSet::new(),
            ranges: BTreeSet::new(),
            ordinal,
        }
    }

    /// Returns the node identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns whether the node declares a class or a property.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the `rdfs:label` text, if declared.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the `rdfs:comment` text, if declared.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Display name used for lookups: the label-independent local name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
    }

    /// Direct `subClassOf` / `subPropertyOf` targets.
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<Iri> {
        &self.parents
    }

    /// Declared `rdfs:domain` targets (properties only).
    #[must_use]
    pub fn domains(&self) -> &BTreeSet<Iri> {
        &self.domains
    }

    /// Declared `rdfs:range` targets (properties only).
    #[must_use]
    pub fn ranges(&self) -> &BTreeSet<Iri> {
        &self.ranges
    }

    /// Position of the node's first declaration in the source.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Validated set of schema nodes keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    nodes: BTreeMap<Iri, SchemaNode>,
    datatypes: BTreeSet<Iri>,
}

impl SchemaRegistry {
    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: &Iri) -> Option<&SchemaNode> {
        self.nodes.get(id)
    }

    /// Returns the nodes of one kind in declaration order.
    #[must_use]
    pub fn nodes_of(&self, kind: NodeKind) -> Vec<&SchemaNode> {
        let mut nodes: Vec<&SchemaNode> = self.nodes.values().filter(|n| n.kind == kind).collect();
        nodes.sort_by_key(|n| n.ordinal);
        nodes
    }

    /// Returns every class node in declaration order.
    #[must_use]
    pub fn classes(&self) -> Vec<&SchemaNode> {
        self.nodes_of(NodeKind::Class)
    }

    /// Returns every property node in declaration order.
    #[must_use]
    pub fn properties(&self) -> Vec<&SchemaNode> {
        self.nodes_of(NodeKind::Property)
    }

    /// Datatypes declared with `rdf:type rdfs:Datatype`.
    #[must_use]
    pub fn datatypes(&self) -> &BTreeSet<Iri> {
        &self.datatypes
    }

    /// Returns the literal datatype an IRI denotes, if any.
    #[must_use]
    pub fn datatype(&self, iri: &Iri) -> Option<Datatype> {
        Datatype::from_iri(iri.as_str()).or_else(|| {
            self.datatypes
                .contains(iri)
                .then(|| Datatype::Custom(iri.clone()))
        })
    }

    /// Number of declared nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
