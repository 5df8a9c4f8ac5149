//! Registry → live types.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::config::SynthesisConfig;
use crate::error::{NodeKind, SchemaError};
use crate::iri::Iri;
use crate::schema::{SchemaNode, SchemaRegistry};
use crate::session::SessionLedger;
use crate::synthesis::closure::Hierarchy;
use crate::synthesis::types::{PropertySpec, RangeConstraint, SynthesizedType};
use crate::vocab;

/// Every type and property resolved from one registry.
#[derive(Debug, Clone, Default)]
pub struct SynthesizedSchema {
    types: Vec<Arc<SynthesizedType>>,
    type_index: HashMap<String, usize>,
    type_names: HashMap<String, usize>,
    properties: Vec<Arc<PropertySpec>>,
    property_index: HashMap<String, usize>,
    property_names: HashMap<String, usize>,
}

impl SynthesizedSchema {
    fn new(types: Vec<Arc<SynthesizedType>>, properties: Vec<Arc<PropertySpec>>) -> Self {
        let type_index = types
            .iter()
            .enumerate()
            .map(|(idx, ty)| (ty.id().as_str().to_string(), idx))
            .collect();
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.id().as_str().to_string(), idx))
            .collect();

        // First declaration wins a shared display name.
        let mut type_names = HashMap::new();
        for (idx, ty) in types.iter().enumerate() {
            type_names.entry(ty.name().to_string()).or_insert(idx);
        }
        let mut property_names = HashMap::new();
        for (idx, spec) in properties.iter().enumerate() {
            property_names.entry(spec.name().to_string()).or_insert(idx);
        }

        Self {
            types,
            type_index,
            type_names,
            properties,
            property_index,
            property_names,
        }
    }

    /// Types in class declaration order.
    #[must_use]
    pub fn types(&self) -> &[Arc<SynthesizedType>] {
        &self.types
    }

    /// Looks up a type by IRI or display name.
    #[must_use]
    pub fn class(&self, name_or_iri: &str) -> Option<&Arc<SynthesizedType>> {
        self.type_index
            .get(name_or_iri)
            .or_else(|| self.type_names.get(name_or_iri))
            .map(|idx| &self.types[*idx])
    }

    /// Properties in declaration order, builtins last.
    #[must_use]
    pub fn properties(&self) -> &[Arc<PropertySpec>] {
        &self.properties
    }

    /// Looks up a property by IRI or display name.
    #[must_use]
    pub fn property(&self, name_or_iri: &str) -> Option<&Arc<PropertySpec>> {
        self.property_index
            .get(name_or_iri)
            .or_else(|| self.property_names.get(name_or_iri))
            .map(|idx| &self.properties[*idx])
    }
}

/// Builds a [`SynthesizedSchema`] from a validated registry.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    /// Creates a synthesizer with the given settings.
    #[must_use]
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Synthesizes every type and records it in the current ledger.
    ///
    /// # Errors
    /// `CyclicInheritance` if either hierarchy has a cycle; no type is
    /// produced or recorded in that case.
    pub fn synthesize(&self, registry: &SchemaRegistry) -> Result<SynthesizedSchema, SchemaError> {
        self.synthesize_in(registry, &SessionLedger::current())
    }

    /// Like [`Self::synthesize`], recording types in `ledger`.
    pub fn synthesize_in(
        &self,
        registry: &SchemaRegistry,
        ledger: &SessionLedger,
    ) -> Result<SynthesizedSchema, SchemaError> {
        let classes = Hierarchy::new(registry, NodeKind::Class);
        let properties = Hierarchy::new(registry, NodeKind::Property);
        classes.check_acyclic()?;
        properties.check_acyclic()?;

        let mut specs: Vec<Arc<PropertySpec>> = registry
            .properties()
            .into_iter()
            .map(|node| Arc::new(resolve_property(registry, &properties, node)))
            .collect();
        if self.config.builtin_properties {
            let mut ordinal = registry.len();
            for (id, range) in vocab::BUILTIN_PROPERTIES {
                let id = Iri::trusted(*id);
                if registry.node(&id).is_none() {
                    specs.push(Arc::new(PropertySpec::builtin(id, *range, ordinal)));
                    ordinal += 1;
                }
            }
        }

        let mut by_domain: HashMap<&Iri, Vec<&Arc<PropertySpec>>> = HashMap::new();
        let mut universal: Vec<&Arc<PropertySpec>> = Vec::new();
        for spec in &specs {
            if spec.is_universal() {
                universal.push(spec);
            } else {
                for domain in spec.domains() {
                    by_domain.entry(domain).or_default().push(spec);
                }
            }
        }

        let types: Vec<Arc<SynthesizedType>> = registry
            .classes()
            .into_iter()
            .map(|node| {
                let ancestors = classes.ancestors(node.id());
                let lineage: Vec<&Iri> = std::iter::once(node.id()).chain(ancestors.iter().copied()).collect();

                let mut candidates: Vec<(usize, Arc<PropertySpec>)> = Vec::new();
                for (rank, class) in lineage.iter().enumerate() {
                    for spec in by_domain.get(class).into_iter().flatten() {
                        candidates.push((rank, Arc::clone(spec)));
                    }
                }
                let tail = lineage.len();
                for spec in &universal {
                    let rank = if spec.is_builtin() { tail + 1 } else { tail };
                    candidates.push((rank, Arc::clone(spec)));
                }

                // Ranks past the lineage are universal attachments.
                let above: Vec<HashSet<&Iri>> = lineage
                    .iter()
                    .map(|class| classes.ancestors(class).into_iter().collect())
                    .collect();
                let more_specific = |a: usize, b: usize| match (lineage.get(a), lineage.get(b)) {
                    (Some(_), Some(general)) => above[a].contains(*general),
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => a < b,
                };

                Arc::new(SynthesizedType::assemble(
                    node.id().clone(),
                    node.label().map(str::to_string),
                    node.comment().map(str::to_string),
                    ancestors.into_iter().cloned().collect(),
                    candidates,
                    more_specific,
                    node.ordinal(),
                ))
            })
            .collect();

        for ty in &types {
            ledger.record_type(ty);
        }
        tracing::info!(
            ledger = %ledger.id(),
            types = types.len(),
            properties = specs.len(),
            "ontology types synthesized"
        );

        Ok(SynthesizedSchema::new(types, specs))
    }
}

fn resolve_property(registry: &SchemaRegistry, hierarchy: &Hierarchy<'_>, node: &SchemaNode) -> PropertySpec {
    let chain: Vec<&SchemaNode> = hierarchy
        .ancestors(node.id())
        .into_iter()
        .filter_map(|id| registry.node(id))
        .collect();

    // The nearest declarations are those no other declaring ancestor descends from.
    let nearest = |select: fn(&SchemaNode) -> &BTreeSet<Iri>| -> Option<BTreeSet<Iri>> {
        if !select(node).is_empty() {
            return Some(select(node).clone());
        }
        let declaring: Vec<&SchemaNode> = chain.iter().copied().filter(|n| !select(n).is_empty()).collect();
        let covered: HashSet<&Iri> = declaring
            .iter()
            .flat_map(|n| hierarchy.ancestors(n.id()))
            .collect();
        let union: BTreeSet<Iri> = declaring
            .iter()
            .filter(|n| !covered.contains(n.id()))
            .flat_map(|n| select(n).iter().cloned())
            .collect();
        (!union.is_empty()).then_some(union)
    };
    let inferred = |select: fn(&SchemaNode) -> &BTreeSet<Iri>| -> Vec<Iri> {
        let union: BTreeSet<&Iri> = std::iter::once(node)
            .chain(chain.iter().copied())
            .flat_map(|n| select(n).iter())
            .collect();
        union.into_iter().cloned().collect()
    };

    let effective_domains = nearest(SchemaNode::domains).unwrap_or_default();
    let universal = effective_domains.is_empty()
        || effective_domains
            .iter()
            .any(|domain| vocab::is_universal_class(domain.as_str()));
    let domains = if universal {
        Vec::new()
    } else {
        effective_domains.into_iter().collect()
    };

    let range = nearest(SchemaNode::ranges)
        .unwrap_or_default()
        .into_iter()
        .filter(|target| !vocab::is_universal_class(target.as_str()))
        .map(|target| match registry.datatype(&target) {
            Some(datatype) => RangeConstraint::Datatype(datatype),
            None => RangeConstraint::Class(target),
        })
        .collect();

    PropertySpec {
        id: node.id().clone(),
        label: node.label().map(str::to_string),
        comment: node.comment().map(str::to_string),
        super_properties: chain.iter().map(|ancestor| ancestor.id().clone()).collect(),
        sub_properties: hierarchy.descendants(node.id()).into_iter().cloned().collect(),
        domains,
        universal,
        range,
        declared_domains: node.domains().iter().cloned().collect(),
        declared_ranges: node.ranges().iter().cloned().collect(),
        inferred_domain: inferred(SchemaNode::domains),
        inferred_range: inferred(SchemaNode::ranges),
        ordinal: node.ordinal(),
        builtin: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use crate::triple::Triple;
    use crate::value::{Datatype, InstanceRef, Value};
    use crate::vocab::{rdf, rdfs, xsd};

    fn ex(name: &str) -> Iri {
        Iri::new(format!("http://ex.org/{name}")).unwrap()
    }

    fn vocab_iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    struct Ttl(Vec<Triple>);

    impl Ttl {
        fn new() -> Self {
            Self(Vec::new())
        }

        fn class(mut self, name: &str, parents: &[&str]) -> Self {
            self.0.push(Triple::new(ex(name), vocab_iri(rdf::TYPE), vocab_iri(rdfs::CLASS)));
            for parent in parents {
                self.0.push(Triple::new(ex(name), vocab_iri(rdfs::SUB_CLASS_OF), ex(parent)));
            }
            self
        }

        fn property(mut self, name: &str, parents: &[&str], domain: Option<&str>, range: Option<Iri>) -> Self {
            self.0.push(Triple::new(ex(name), vocab_iri(rdf::TYPE), vocab_iri(rdf::PROPERTY)));
            for parent in parents {
                self.0.push(Triple::new(ex(name), vocab_iri(rdfs::SUB_PROPERTY_OF), ex(parent)));
            }
            if let Some(domain) = domain {
                self.0.push(Triple::new(ex(name), vocab_iri(rdfs::DOMAIN), ex(domain)));
            }
            if let Some(range) = range {
                self.0.push(Triple::new(ex(name), vocab_iri(rdfs::RANGE), range));
            }
            self
        }

        fn triple(mut self, subject: &str, predicate: &str, object: &str) -> Self {
            self.0.push(Triple::new(vocab_iri(subject), vocab_iri(predicate), vocab_iri(object)));
            self
        }

        fn synthesize(&self, config: SynthesisConfig) -> Result<SynthesizedSchema, SchemaError> {
            let registry = SchemaBuilder::default().ingest(&self.0).unwrap();
            Synthesizer::new(config).synthesize_in(&registry, &SessionLedger::new())
        }
    }

    fn geo() -> Ttl {
        Ttl::new()
            .class("Place", &[])
            .class("Country", &["Place"])
            .class("Language", &[])
            .property("name", &[], Some("Place"), Some(vocab_iri(xsd::STRING)))
            .property("officialLanguage", &[], Some("Country"), Some(ex("Language")))
            .property("nativeName", &["name"], None, None)
    }

    #[test]
    fn test_inherited_properties_are_attached() {
        let schema = geo().synthesize(SynthesisConfig::default()).unwrap();
        let country = schema.class("Country").unwrap();

        assert_eq!(country.ancestors(), &[ex("Place")]);
        assert!(country.property("name").is_some());
        assert!(country.property("officialLanguage").is_some());
        assert!(country.property("label").is_some());

        let place = schema.class("Place").unwrap();
        assert!(place.property("officialLanguage").is_none());
        assert!(schema.class("Language").unwrap().property("name").is_none());
    }

    #[test]
    fn test_subproperty_inherits_domain_and_range() {
        let schema = geo().synthesize(SynthesisConfig::default()).unwrap();
        let native = schema.property("nativeName").unwrap();

        assert_eq!(native.super_properties(), &[ex("name")]);
        assert_eq!(native.domains(), &[ex("Place")]);
        assert_eq!(native.range(), &[RangeConstraint::Datatype(Datatype::String)]);
        assert!(native.declared_ranges().is_empty());
        assert_eq!(native.inferred_range(), &[vocab_iri(xsd::STRING)]);
        assert!(schema.class("Country").unwrap().property("nativeName").is_some());

        let name = schema.property("name").unwrap();
        assert_eq!(name.sub_properties(), &[ex("nativeName")]);
        assert!(name.reflects(&ex("nativeName")));
        assert!(!native.reflects(&ex("name")));
    }

    #[test]
    fn test_nearest_range_wins_but_inferred_unions() {
        let schema = Ttl::new()
            .class("Agent", &[])
            .class("Person", &["Agent"])
            .property("knows", &[], None, Some(ex("Agent")))
            .property("friend", &["knows"], None, Some(ex("Person")))
            .synthesize(SynthesisConfig::default())
            .unwrap();

        let friend = schema.property("friend").unwrap();
        assert_eq!(friend.range(), &[RangeConstraint::Class(ex("Person"))]);
        assert_eq!(friend.inferred_range(), &[ex("Agent"), ex("Person")]);
        assert!(friend.is_universal());
    }

    #[test]
    fn test_redundant_edge_keeps_most_specific_name() {
        let schema = Ttl::new()
            .class("Place", &[])
            .class("Region", &["Place"])
            .class("Country", &["Region", "Place"])
            .triple("http://a.org/name", rdf::TYPE, rdf::PROPERTY)
            .triple("http://a.org/name", rdfs::DOMAIN, "http://ex.org/Place")
            .triple("http://b.org/name", rdf::TYPE, rdf::PROPERTY)
            .triple("http://b.org/name", rdfs::DOMAIN, "http://ex.org/Region")
            .synthesize(SynthesisConfig::default())
            .unwrap();
        let country = schema.class("Country").unwrap();

        assert_eq!(country.ancestors(), &[ex("Region"), ex("Place")]);
        assert_eq!(country.property("name").unwrap().id(), &vocab_iri("http://b.org/name"));
        assert!(country.property("http://a.org/name").is_some());
        let place = schema.class("Place").unwrap();
        assert_eq!(place.property("name").unwrap().id(), &vocab_iri("http://a.org/name"));
    }

    #[test]
    fn test_redundant_subproperty_edge_keeps_nearest_range() {
        let schema = Ttl::new()
            .class("Agent", &[])
            .class("Person", &["Agent"])
            .property("related", &[], None, Some(ex("Agent")))
            .property("knows", &["related"], None, Some(ex("Person")))
            .property("friend", &["related", "knows"], None, None)
            .synthesize(SynthesisConfig::default())
            .unwrap();

        let friend = schema.property("friend").unwrap();
        assert_eq!(friend.super_properties(), &[ex("knows"), ex("related")]);
        assert_eq!(friend.range(), &[RangeConstraint::Class(ex("Person"))]);
        assert_eq!(friend.inferred_range(), &[ex("Agent"), ex("Person")]);
    }

    #[test]
    fn test_universal_property_loses_to_declared_name() {
        let schema = Ttl::new()
            .class("Country", &[])
            .property("code", &[], None, None)
            .synthesize(SynthesisConfig::default())
            .unwrap();
        let country = schema.class("Country").unwrap();
        assert_eq!(country.property("code").unwrap().id(), &ex("code"));
        let names: Vec<&str> = country.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["code", "label", "comment", "seeAlso", "isDefinedBy", "value"]);
    }

    #[test]
    fn test_builtins_can_be_disabled() {
        let schema = geo()
            .synthesize(SynthesisConfig {
                builtin_properties: false,
            })
            .unwrap();
        assert!(schema.class("Country").unwrap().property("label").is_none());
    }

    #[test]
    fn test_cycle_produces_no_types() {
        let ledger = SessionLedger::new();
        let ttl = Ttl::new().class("A", &["B"]).class("B", &["A"]);
        let registry = SchemaBuilder::default().ingest(&ttl.0).unwrap();
        let err = Synthesizer::default().synthesize_in(&registry, &ledger).unwrap_err();

        assert!(matches!(err, SchemaError::CyclicInheritance { kind: NodeKind::Class, .. }));
        assert!(ledger.types().is_empty());
    }

    #[test]
    fn test_property_cycle_is_detected() {
        let err = Ttl::new()
            .property("p", &["q"], None, None)
            .property("q", &["p"], None, None)
            .synthesize(SynthesisConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::CyclicInheritance { kind: NodeKind::Property, .. }));
    }

    #[test]
    fn test_types_are_recorded_in_ledger() {
        let ledger = SessionLedger::new();
        let registry = SchemaBuilder::default().ingest(&geo().0).unwrap();
        let schema = Synthesizer::default().synthesize_in(&registry, &ledger).unwrap();
        assert_eq!(ledger.types().len(), schema.types().len());
    }

    #[test]
    fn test_range_check_uses_subclass_closure() {
        let schema = Ttl::new()
            .class("Language", &[])
            .class("Dialect", &["Language"])
            .class("Currency", &[])
            .class("Country", &[])
            .property("officialLanguage", &[], Some("Country"), Some(ex("Language")))
            .synthesize(SynthesisConfig::default())
            .unwrap();
        let official = schema.property("officialLanguage").unwrap();
        let dialect = Arc::clone(schema.class("Dialect").unwrap());
        let currency = Arc::clone(schema.class("Currency").unwrap());

        assert!(official.check(&Value::Instance(InstanceRef::new(ex("cantonese"), dialect))).is_ok());
        assert!(official.check(&Value::Instance(InstanceRef::new(ex("usDollar"), currency))).is_err());
    }
}
