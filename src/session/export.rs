//! Streaming a ledger back out as statements.

use std::collections::VecDeque;

use crate::config::ExportConfig;
use crate::instance::Instance;
use crate::iri::Iri;
use crate::session::ledger::SessionLedger;
use crate::triple::{Term, Triple};
use crate::value::Value;
use crate::vocab::rdf;

/// One exported `(subject, predicate, object)` statement.
///
/// Literal objects carry their language tag on the [`crate::Literal`].
pub type Statement = Triple;

impl From<&Value> for Term {
    fn from(value: &Value) -> Self {
        match value {
            Value::Instance(instance) => Self::Iri(instance.id().clone()),
            Value::Resource(iri) => Self::Iri(iri.clone()),
            Value::Literal(literal) => Self::Literal(literal.clone()),
        }
    }
}

/// Restartable view over a ledger's statements.
///
/// Every call to [`Statements::iter`] starts again from the first recorded
/// instance and reflects the ledger as it is while iterating. Nothing is
/// materialised up front: the iterator holds at most one instance's
/// statements at a time.
///
/// Order: instances in recording order; per instance, the `rdf:type`
/// statement (if enabled), then properties in the type's declaration order,
/// then values in assignment order.
#[derive(Debug, Clone)]
pub struct Statements {
    ledger: SessionLedger,
    config: ExportConfig,
}

impl Statements {
    pub(crate) fn new(ledger: SessionLedger, config: ExportConfig) -> Self {
        Self { ledger, config }
    }

    /// Starts a fresh pass over the ledger.
    #[must_use]
    pub fn iter(&self) -> StatementIter {
        StatementIter {
            ledger: self.ledger.clone(),
            config: self.config,
            next_instance: 0,
            pending: VecDeque::new(),
        }
    }

    /// Collects a full pass into an `oxrdf` graph for a persistence backend.
    #[must_use]
    pub fn to_graph(&self) -> oxrdf::Graph {
        let mut graph = oxrdf::Graph::new();
        for statement in self {
            graph.insert(&statement.to_oxrdf());
        }
        graph
    }
}

impl<'a> IntoIterator for &'a Statements {
    type Item = Statement;
    type IntoIter = StatementIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over a ledger's statements.
#[derive(Debug)]
pub struct StatementIter {
    ledger: SessionLedger,
    config: ExportConfig,
    next_instance: usize,
    pending: VecDeque<Statement>,
}

impl StatementIter {
    fn expand(&mut self, instance: &Instance) {
        if self.config.include_type_statements {
            self.pending.push_back(Triple::new(
                instance.id().clone(),
                Iri::trusted(rdf::TYPE),
                instance.class().id().clone(),
            ));
        }
        for (property, values) in instance.assertions() {
            self.pending.extend(
                values
                    .iter()
                    .map(|value| Triple::new(instance.id().clone(), property.clone(), Term::from(value))),
            );
        }
    }
}

impl Iterator for StatementIter {
    type Item = Statement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(statement) = self.pending.pop_front() {
                return Some(statement);
            }
            let instance = self.ledger.instance_at(self.next_instance)?;
            self.next_instance += 1;
            self.expand(&instance);
        }
    }
}
