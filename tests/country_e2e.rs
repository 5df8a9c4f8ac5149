use oxrdf::{Graph, Literal as OxLiteral, NamedNode, Triple as OxTriple};

use ontoledger::vocab::{owl, rdf, rdfs, xsd};
use ontoledger::{
    Iri, Literal, Ontology, OntologyConfig, SchemaError, SessionLedger, Triple, ValidationError, Value,
};

const GEO: &str = "http://example.org/geo#";

fn geo(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{GEO}{name}"))
}

fn node(iri: &str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

fn iri(name: &str) -> Iri {
    Iri::new(format!("{GEO}{name}")).unwrap()
}

/// The country/currency/language ontology, as a parser would hand it over.
fn geo_graph() -> Graph {
    let mut graph = Graph::new();
    let mut add = |s: NamedNode, p: &str, o: oxrdf::Term| {
        graph.insert(&OxTriple::new(s, node(p), o));
    };

    for class in ["Place", "Country", "Currency", "Language"] {
        add(geo(class), rdf::TYPE, node(rdfs::CLASS).into());
    }
    add(geo("Country"), rdfs::SUB_CLASS_OF, geo("Place").into());
    add(
        geo("Country"),
        rdfs::LABEL,
        OxLiteral::new_language_tagged_literal_unchecked("Country", "en").into(),
    );

    add(geo("officialLanguage"), rdf::TYPE, node(owl::OBJECT_PROPERTY).into());
    add(geo("officialLanguage"), rdfs::DOMAIN, geo("Country").into());
    add(geo("officialLanguage"), rdfs::RANGE, geo("Language").into());

    add(geo("currency"), rdf::TYPE, node(rdf::PROPERTY).into());
    add(geo("currency"), rdfs::DOMAIN, geo("Country").into());
    add(geo("currency"), rdfs::RANGE, geo("Currency").into());

    add(geo("name"), rdf::TYPE, node(owl::DATATYPE_PROPERTY).into());
    add(geo("name"), rdfs::DOMAIN, geo("Place").into());
    add(geo("name"), rdfs::SUB_PROPERTY_OF, node(rdfs::LABEL).into());

    add(geo("population"), rdf::TYPE, node(rdf::PROPERTY).into());
    add(geo("population"), rdfs::DOMAIN, geo("Country").into());
    add(geo("population"), rdfs::RANGE, node(xsd::INTEGER).into());

    graph
}

#[test]
fn official_language_range_is_enforced() {
    let ledger = SessionLedger::new();
    let ontology = Ontology::load_in(&geo_graph(), &OntologyConfig::default(), &ledger).unwrap();

    let mandarin = ontology.instantiate("Language").unwrap().id(iri("mandarin")).build_in(&ledger).unwrap();
    let us_dollar = ontology.instantiate("Currency").unwrap().id(iri("usDollar")).build_in(&ledger).unwrap();
    let china = ontology.instantiate("Country").unwrap().id(iri("china")).build_in(&ledger).unwrap();
    let united_states = ontology
        .instantiate("Country")
        .unwrap()
        .id(iri("unitedStates"))
        .build_in(&ledger)
        .unwrap();

    china.assign("officialLanguage", &mandarin).unwrap();
    assert!(china.contains("officialLanguage", &mandarin).unwrap());

    let err = united_states.assign("officialLanguage", &us_dollar).unwrap_err();
    match err {
        ValidationError::RangeMismatch { property, expected, found } => {
            assert_eq!(property, iri("officialLanguage"));
            assert!(expected.contains("Language"));
            assert!(found.contains("usDollar"));
        }
        other => panic!("expected RangeMismatch, got {other:?}"),
    }
    assert!(united_states.values("officialLanguage").unwrap().is_empty());

    united_states.assign("currency", &us_dollar).unwrap();
    assert_eq!(ledger.assertion_count(), 2);
}

#[test]
fn inherited_and_builtin_properties_resolve() {
    let ledger = SessionLedger::new();
    let ontology = Ontology::load_in(&geo_graph(), &OntologyConfig::default(), &ledger).unwrap();
    let country = ontology.class("Country").unwrap();

    assert_eq!(country.label(), Some("Country"));
    assert_eq!(country.ancestors(), &[iri("Place")]);
    for name in ["name", "officialLanguage", "currency", "population", "label", "comment", "seeAlso"] {
        assert!(country.property(name).is_some(), "Country should expose {name}");
    }
    assert!(ontology.class("Place").unwrap().property("population").is_none());
    assert!(ontology.class("Language").unwrap().property("label").is_some());

    let name = ontology.property("name").unwrap();
    assert_eq!(name.super_properties(), &[Iri::new(rdfs::LABEL).unwrap()]);
}

#[test]
fn subproperty_values_are_visible_through_super_property() {
    let ledger = SessionLedger::new();
    let ontology = Ontology::load_in(&geo_graph(), &OntologyConfig::default(), &ledger).unwrap();
    let china = ontology
        .instantiate("Country")
        .unwrap()
        .with_lang("name", "Zhongguo", "zh")
        .with("population", 1_412_000_000_i64)
        .build_in(&ledger)
        .unwrap();

    assert!(china.contains("label", "Zhongguo").unwrap());
    assert!(china.contains_lang("label", "Zhongguo", "zh").unwrap());
    assert_eq!(
        china.values_in("label", "zh").unwrap(),
        vec![Value::from(Literal::tagged("Zhongguo", "zh").unwrap())]
    );

    china.assign("label", "China").unwrap();
    assert!(!china.contains("name", "China").unwrap());
}

#[test]
fn literal_ranges_are_enforced() {
    let ledger = SessionLedger::new();
    let ontology = Ontology::load_in(&geo_graph(), &OntologyConfig::default(), &ledger).unwrap();
    let china = ontology.instantiate("Country").unwrap().build_in(&ledger).unwrap();

    assert!(matches!(
        china.assign("population", "a lot"),
        Err(ValidationError::RangeMismatch { .. })
    ));
    assert!(matches!(
        china.assign("population", 1.5),
        Err(ValidationError::RangeMismatch { .. })
    ));
    china.assign("population", 1_412_000_000_i64).unwrap();
    assert!(matches!(
        china.assign("anthem", "March of the Volunteers"),
        Err(ValidationError::UnknownProperty { .. })
    ));
}

#[test]
fn malformed_schemas_fail_the_whole_load() {
    let ledger = SessionLedger::new();
    let t = |s: &str, p: &str, o: &str| {
        Triple::new(Iri::new(s).unwrap(), Iri::new(p).unwrap(), Iri::new(o).unwrap())
    };
    let a = "http://example.org/geo#A";
    let b = "http://example.org/geo#B";

    let cyclic = vec![
        t(a, rdf::TYPE, rdfs::CLASS),
        t(b, rdf::TYPE, rdfs::CLASS),
        t(a, rdfs::SUB_CLASS_OF, b),
        t(b, rdfs::SUB_CLASS_OF, a),
    ];
    let err = Ontology::load_in(&cyclic, &OntologyConfig::default(), &ledger).unwrap_err();
    match err {
        SchemaError::CyclicInheritance { members, .. } => {
            assert!(members.contains(&Iri::new(a).unwrap()));
            assert!(members.contains(&Iri::new(b).unwrap()));
        }
        other => panic!("expected CyclicInheritance, got {other:?}"),
    }
    assert!(ledger.types().is_empty());

    let dangling = vec![t(a, rdf::TYPE, rdfs::CLASS), t(a, rdfs::SUB_CLASS_OF, b)];
    assert!(matches!(
        Ontology::load_in(&dangling, &OntologyConfig::default(), &ledger),
        Err(SchemaError::DanglingReference { .. })
    ));

    let mixed = vec![
        t(a, rdf::TYPE, rdfs::CLASS),
        t(b, rdf::TYPE, rdf::PROPERTY),
        t(a, rdfs::SUB_CLASS_OF, b),
    ];
    assert!(matches!(
        Ontology::load_in(&mixed, &OntologyConfig::default(), &ledger),
        Err(SchemaError::KindMismatch { .. })
    ));
    assert!(ledger.types().is_empty());
}

#[test]
fn owl_declarations_can_be_ignored() {
    let config = OntologyConfig::from_json_str(r#"{"schema": {"recognize_owl": false}}"#).unwrap();
    let ontology = Ontology::load_in(&geo_graph(), &config, &SessionLedger::new());
    // `officialLanguage` is only declared through owl:ObjectProperty.
    assert!(matches!(ontology, Err(SchemaError::DanglingReference { .. })));
}
