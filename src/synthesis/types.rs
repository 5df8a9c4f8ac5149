//! Synthesized types and resolved property specs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::iri::Iri;
use crate::value::{Datatype, Value};
use crate::vocab;

/// One constraint a property's effective range imposes on values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeConstraint {
    /// The value must be an instance of this class or of a subclass.
    Class(Iri),
    /// The value must be a literal of this datatype.
    Datatype(Datatype),
}

impl RangeConstraint {
    /// Returns true if `value` satisfies the constraint.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Class(class), Value::Instance(instance)) => instance.class().is_a(class),
            (Self::Datatype(datatype), Value::Literal(literal)) => datatype.accepts(literal),
            _ => false,
        }
    }
}

impl fmt::Display for RangeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "instance of <{class}>"),
            Self::Datatype(datatype) => write!(f, "{datatype}"),
        }
    }
}

/// Closure-aware description of one property.
///
/// The effective domain and range come from the nearest declaration walking
/// up the subproperty chain; the inferred variants union every declaration
/// along it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub(crate) id: Iri,
    pub(crate) label: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) super_properties: Vec<Iri>,
    pub(crate) sub_properties: Vec<Iri>,
    pub(crate) domains: Vec<Iri>,
    pub(crate) universal: bool,
    pub(crate) range: Vec<RangeConstraint>,
    pub(crate) declared_domains: Vec<Iri>,
    pub(crate) declared_ranges: Vec<Iri>,
    pub(crate) inferred_domain: Vec<Iri>,
    pub(crate) inferred_range: Vec<Iri>,
    pub(crate) ordinal: usize,
    pub(crate) builtin: bool,
}

impl PropertySpec {
    /// Spec for an annotation property the schema never declares.
    pub(crate) fn builtin(id: Iri, range: Option<&str>, ordinal: usize) -> Self {
        let declared_ranges: Vec<Iri> = range.map(Iri::trusted).into_iter().collect();
        Self {
            label: None,
            comment: None,
            super_properties: Vec::new(),
            sub_properties: Vec::new(),
            domains: Vec::new(),
            universal: true,
            range: range
                .and_then(Datatype::from_iri)
                .map(RangeConstraint::Datatype)
                .into_iter()
                .collect(),
            inferred_range: declared_ranges.clone(),
            declared_ranges,
            declared_domains: Vec::new(),
            inferred_domain: Vec::new(),
            ordinal,
            builtin: true,
            id,
        }
    }

    /// Returns the IRI.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Display name used for lookups on a type.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
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

    /// Transitive super-properties, most specific first.
    #[must_use]
    pub fn super_properties(&self) -> &[Iri] {
        &self.super_properties
    }

    /// Transitive sub-properties whose assertions this property reflects.
    #[must_use]
    pub fn sub_properties(&self) -> &[Iri] {
        &self.sub_properties
    }

    /// Classes this property attaches to. Empty for universal properties.
    #[must_use]
    pub fn domains(&self) -> &[Iri] {
        &self.domains
    }

    /// True if the property attaches to every type.
    #[must_use]
    pub const fn is_universal(&self) -> bool {
        self.universal
    }

    /// Effective range constraints; every one must hold. Empty means untyped.
    #[must_use]
    pub fn range(&self) -> &[RangeConstraint] {
        &self.range
    }

    /// Domains asserted on this property itself.
    #[must_use]
    pub fn declared_domains(&self) -> &[Iri] {
        &self.declared_domains
    }

    /// Ranges asserted on this property itself.
    #[must_use]
    pub fn declared_ranges(&self) -> &[Iri] {
        &self.declared_ranges
    }

    /// Union of the domains declared on this property and its super-properties.
    #[must_use]
    pub fn inferred_domain(&self) -> &[Iri] {
        &self.inferred_domain
    }

    /// Union of the ranges declared on this property and its super-properties.
    #[must_use]
    pub fn inferred_range(&self) -> &[Iri] {
        &self.inferred_range
    }

    /// Position in declaration order.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// True for the annotation properties exposed without a declaration.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Returns true if an assertion through `property` is visible through
    /// this one.
    #[must_use]
    pub fn reflects(&self, property: &Iri) -> bool {
        self.id == *property || self.sub_properties.contains(property)
    }

    /// Validates a value against the effective range.
    ///
    /// # Errors
    /// `RangeMismatch` naming the first unmet constraint.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match self.range.iter().find(|constraint| !constraint.accepts(value)) {
            None => Ok(()),
            Some(unmet) => Err(ValidationError::RangeMismatch {
                property: self.id.clone(),
                expected: unmet.to_string(),
                found: value.describe(),
            }),
        }
    }
}

/// A live, instantiable type synthesized from one class node.
///
/// Shared read-only by every instance of the type.
#[derive(Debug)]
pub struct SynthesizedType {
    id: Iri,
    label: Option<String>,
    comment: Option<String>,
    ancestors: Vec<Iri>,
    properties: Vec<Arc<PropertySpec>>,
    by_iri: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    ordinal: usize,
}

impl SynthesizedType {
    /// Assembles a type from its attachment candidates.
    ///
    /// `candidates` pairs each attachable property with the rank of the class
    /// it attaches through. Ranks follow the type's lineage, so a class always
    /// ranks ahead of its ancestors; `more_specific(a, b)` tells whether rank
    /// `a` descends from rank `b`. A property reachable along several paths
    /// keeps its best rank.
    ///
    /// A display name resolves to the best-ranked candidate. Candidates it
    /// does not descend from (same class, or an unrelated branch) lose to the
    /// earlier declaration with a warning.
    pub(crate) fn assemble(
        id: Iri,
        label: Option<String>,
        comment: Option<String>,
        ancestors: Vec<Iri>,
        candidates: Vec<(usize, Arc<PropertySpec>)>,
        more_specific: impl Fn(usize, usize) -> bool,
        ordinal: usize,
    ) -> Self {
        let mut best: HashMap<Iri, (usize, Arc<PropertySpec>)> = HashMap::new();
        for (priority, spec) in candidates {
            let improves = best.get(spec.id()).map_or(true, |(current, _)| priority < *current);
            if improves {
                best.insert(spec.id().clone(), (priority, spec));
            }
        }

        let mut ranked: Vec<(usize, Arc<PropertySpec>)> = best.into_values().collect();
        ranked.sort_by_key(|(priority, spec)| (*priority, spec.ordinal));

        let mut by_name: HashMap<String, (usize, Iri)> = HashMap::new();
        for (priority, spec) in &ranked {
            if let Some((winner_priority, winner)) = by_name.get(spec.name()) {
                if !more_specific(*winner_priority, *priority) {
                    tracing::warn!(
                        class = %id,
                        name = spec.name(),
                        kept = %winner,
                        shadowed = %spec.id(),
                        "unrelated properties share a display name"
                    );
                }
                continue;
            }
            by_name.insert(spec.name().to_string(), (*priority, spec.id().clone()));
        }

        let mut properties: Vec<Arc<PropertySpec>> = ranked.into_iter().map(|(_, spec)| spec).collect();
        properties.sort_by_key(|spec| (spec.builtin, spec.ordinal));

        let by_iri: HashMap<String, usize> = properties
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.id().as_str().to_string(), idx))
            .collect();
        let by_name = by_name
            .into_iter()
            .filter_map(|(name, (_, winner))| by_iri.get(winner.as_str()).map(|idx| (name, *idx)))
            .collect();

        Self {
            id,
            label,
            comment,
            ancestors,
            properties,
            by_iri,
            by_name,
            ordinal,
        }
    }

    /// Returns the IRI.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Display name: the local name of the class IRI.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
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

    /// Strict ancestors, most derived first.
    #[must_use]
    pub fn ancestors(&self) -> &[Iri] {
        &self.ancestors
    }

    /// The type itself followed by its ancestors.
    pub fn lineage(&self) -> impl Iterator<Item = &Iri> {
        std::iter::once(&self.id).chain(self.ancestors.iter())
    }

    /// Returns true if this type is `class` or a descendant of it.
    ///
    /// Every type is an `rdfs:Resource` and an `owl:Thing`.
    #[must_use]
    pub fn is_a(&self, class: &Iri) -> bool {
        vocab::is_universal_class(class.as_str()) || self.lineage().any(|id| id == class)
    }

    /// Looks up an attached property by IRI or display name.
    #[must_use]
    pub fn property(&self, name_or_iri: &str) -> Option<&Arc<PropertySpec>> {
        self.by_iri
            .get(name_or_iri)
            .or_else(|| self.by_name.get(name_or_iri))
            .map(|idx| &self.properties[*idx])
    }

    /// Attached properties in declaration order, builtins last.
    #[must_use]
    pub fn properties(&self) -> &[Arc<PropertySpec>] {
        &self.properties
    }

    /// Display names resolvable through [`Self::property`].
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Position in declaration order.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }
}

impl fmt::Display for SynthesizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.id)
    }
}
