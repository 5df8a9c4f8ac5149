//! Normalised triples: the boundary with the external triple source.
//!
//! Parsing serialized RDF is not this crate's job. A [`TripleSource`] hands
//! over a finite set of `(subject, predicate, object)` statements whose
//! objects are either IRIs or literals; `oxrdf` graphs implement it directly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TermError;
use crate::iri::Iri;
use crate::value::Literal;

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "term", rename_all = "snake_case")]
pub enum Term {
    /// A named resource.
    Iri(Iri),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Returns the IRI, if this term is one.
    #[must_use]
    pub const fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(v) => Some(v),
            Self::Literal(_) => None,
        }
    }

    /// Returns the literal, if this term is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Iri(_) => None,
        }
    }

    /// Converts into an `oxrdf` term.
    #[must_use]
    pub fn to_oxrdf(&self) -> oxrdf::Term {
        match self {
            Self::Iri(iri) => oxrdf::Term::NamedNode(iri.to_named_node()),
            Self::Literal(literal) => oxrdf::Term::Literal(literal.to_oxrdf()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(v) => write!(f, "<{v}>"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

impl From<Iri> for Term {
    fn from(v: Iri) -> Self {
        Self::Iri(v)
    }
}

impl From<Literal> for Term {
    fn from(v: Literal) -> Self {
        Self::Literal(v)
    }
}

impl TryFrom<oxrdf::Term> for Term {
    type Error = TermError;

    fn try_from(term: oxrdf::Term) -> Result<Self, Self::Error> {
        match term {
            oxrdf::Term::NamedNode(node) => Ok(Self::Iri(node.into())),
            oxrdf::Term::Literal(literal) => {
                let datatype = Iri::from(literal.datatype().into_owned());
                let parsed = Literal::from_parts(literal.value(), Some(&datatype), literal.language())
                    .map_err(|_| TermError::UnsupportedTerm {
                        position: "object",
                        term: literal.to_string(),
                    })?;
                Ok(Self::Literal(parsed))
            }
            other => Err(TermError::UnsupportedTerm {
                position: "object",
                term: other.to_string(),
            }),
        }
    }
}

/// A normalised `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    /// Resource the statement is about.
    pub subject: Iri,
    /// Relation being asserted.
    pub predicate: Iri,
    /// Value of the relation.
    pub object: Term,
}

impl Triple {
    /// Creates a new triple.
    #[must_use]
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }

    /// Converts into an `oxrdf` triple.
    #[must_use]
    pub fn to_oxrdf(&self) -> oxrdf::Triple {
        oxrdf::Triple::new(
            self.subject.to_named_node(),
            self.predicate.to_named_node(),
            self.object.to_oxrdf(),
        )
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}

impl TryFrom<oxrdf::Triple> for Triple {
    type Error = TermError;

    fn try_from(triple: oxrdf::Triple) -> Result<Self, Self::Error> {
        let subject = match oxrdf::Term::from(triple.subject) {
            oxrdf::Term::NamedNode(node) => Iri::from(node),
            other => {
                return Err(TermError::UnsupportedTerm {
                    position: "subject",
                    term: other.to_string(),
                })
            }
        };
        Ok(Self {
            subject,
            predicate: triple.predicate.into(),
            object: Term::try_from(triple.object)?,
        })
    }
}

/// Supplier of normalised triples.
///
/// Order is irrelevant: consumers must produce the same result for any
/// permutation of the same set.
pub trait TripleSource {
    /// Returns every triple in the source.
    fn triples(&self) -> Box<dyn Iterator<Item = Triple> + '_>;
}

impl TripleSource for [Triple] {
    fn triples(&self) -> Box<dyn Iterator<Item = Triple> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl TripleSource for Vec<Triple> {
    fn triples(&self) -> Box<dyn Iterator<Item = Triple> + '_> {
        self.as_slice().triples()
    }
}

/// Blank-node statements (OWL restrictions, lists, quoted triples) have no
/// IRI identity and are skipped.
impl TripleSource for oxrdf::Graph {
    fn triples(&self) -> Box<dyn Iterator<Item = Triple> + '_> {
        Box::new(self.iter().filter_map(|triple| {
            match Triple::try_from(triple.into_owned()) {
                Ok(triple) => Some(triple),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping triple the schema cannot address");
                    None
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::LiteralValue;
    use crate::vocab::{rdf, rdfs, xsd};

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_display_is_ntriples_like() {
        let triple = Triple::new(iri("http://ex.org/a"), iri(rdfs::LABEL), Literal::tagged("A", "en").unwrap());
        assert_eq!(
            triple.to_string(),
            "<http://ex.org/a> <http://www.w3.org/2000/01/rdf-schema#label> \"A\"@en ."
        );
    }

    #[test]
    fn test_from_oxrdf_triple() {
        let ox = oxrdf::Triple::new(
            oxrdf::NamedNode::new_unchecked("http://ex.org/china"),
            oxrdf::NamedNode::new_unchecked("http://ex.org/population"),
            oxrdf::Literal::new_typed_literal("1412000000", oxrdf::NamedNode::new_unchecked(xsd::INTEGER)),
        );
        let triple = Triple::try_from(ox).unwrap();
        assert_eq!(triple.subject, "http://ex.org/china");
        let literal = triple.object.as_literal().unwrap();
        assert_eq!(literal.value(), &LiteralValue::Integer(1_412_000_000));
    }

    #[test]
    fn test_blank_subject_is_rejected() {
        let ox = oxrdf::Triple::new(
            oxrdf::BlankNode::default(),
            oxrdf::NamedNode::new_unchecked(rdf::TYPE),
            oxrdf::NamedNode::new_unchecked(rdfs::CLASS),
        );
        let err = Triple::try_from(ox).unwrap_err();
        assert!(matches!(err, TermError::UnsupportedTerm { position: "subject", .. }));
    }

    #[test]
    fn test_graph_source_skips_blank_nodes() {
        let mut graph = oxrdf::Graph::new();
        graph.insert(&oxrdf::Triple::new(
            oxrdf::NamedNode::new_unchecked("http://ex.org/Country"),
            oxrdf::NamedNode::new_unchecked(rdf::TYPE),
            oxrdf::NamedNode::new_unchecked(rdfs::CLASS),
        ));
        graph.insert(&oxrdf::Triple::new(
            oxrdf::BlankNode::default(),
            oxrdf::NamedNode::new_unchecked(rdf::TYPE),
            oxrdf::NamedNode::new_unchecked(rdfs::CLASS),
        ));
        let triples: Vec<Triple> = graph.triples().collect();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].subject, "http://ex.org/Country");
    }

    #[test]
    fn test_oxrdf_round_trip() {
        let triple = Triple::new(iri("http://ex.org/a"), iri(rdfs::SEE_ALSO), iri("http://ex.org/b"));
        let back = Triple::try_from(triple.to_oxrdf()).unwrap();
        assert_eq!(triple, back);
    }
}
