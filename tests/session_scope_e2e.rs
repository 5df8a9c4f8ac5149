use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;

use ontoledger::vocab::{rdf, rdfs};
use ontoledger::{session, Iri, Ontology, OntologyConfig, SessionLedger, Triple};

fn schema() -> Vec<Triple> {
    let t = |s: &str, p: &str, o: &str| Triple::new(Iri::new(s).unwrap(), Iri::new(p).unwrap(), Iri::new(o).unwrap());
    vec![
        t("http://example.org/geo#Country", rdf::TYPE, rdfs::CLASS),
        t("http://example.org/geo#capital", rdf::TYPE, rdf::PROPERTY),
        t("http://example.org/geo#capital", rdfs::DOMAIN, "http://example.org/geo#Country"),
    ]
}

fn ontology() -> Ontology {
    Ontology::load_in(&schema(), &OntologyConfig::default(), &SessionLedger::new()).unwrap()
}

#[test]
fn scoped_instances_stay_out_of_the_global_ledger() {
    let ontology = ontology();
    let scope = SessionLedger::scoped();
    let china = ontology.instantiate("Country").unwrap().build().unwrap();
    assert!(scope.ledger().instance(china.id()).is_some());
    let scoped = scope.exit();

    assert_eq!(scoped.instance_count(), 1);
    assert!(SessionLedger::global().instance(china.id()).is_none());
    assert_eq!(SessionLedger::current(), SessionLedger::global());
}

#[test]
fn nested_scopes_do_not_merge() {
    let ontology = ontology();

    let (inner, outer) = session::with_scope(|outer| {
        let france = ontology.instantiate("Country").unwrap().build().unwrap();
        let (paris, inner) = session::with_scope(|_| ontology.instantiate("Country").unwrap().build().unwrap());

        assert!(outer.instance(france.id()).is_some());
        assert!(outer.instance(paris.id()).is_none());
        assert!(inner.instance(paris.id()).is_some());
        assert_eq!(SessionLedger::current(), *outer);
        inner
    });

    assert_eq!(outer.instance_count(), 1);
    assert_eq!(inner.instance_count(), 1);
}

#[test]
fn scope_is_restored_after_a_panic() {
    let ontology = Arc::new(ontology());
    let worker = Arc::clone(&ontology);

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(move || {
        let _scope = SessionLedger::scoped();
        worker.instantiate("Country").unwrap().build().unwrap();
        panic!("simulated failure inside a scope");
    }));

    assert!(outcome.is_err());
    assert_eq!(SessionLedger::current(), SessionLedger::global());
}

#[test]
fn threads_resolve_their_own_current_ledger() {
    let ontology = Arc::new(ontology());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ontology = Arc::clone(&ontology);
            thread::spawn(move || {
                let (ids, ledger) = session::with_scope(|_| {
                    (0..3)
                        .map(|_| ontology.instantiate("Country").unwrap().build().unwrap().id().clone())
                        .collect::<Vec<_>>()
                });
                (ids, ledger)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (ids, ledger) in &results {
        assert_eq!(ledger.instance_count(), 3);
        for id in ids {
            assert!(ledger.instance(id).is_some());
        }
        for (_, other) in results.iter().filter(|(_, other)| other != ledger) {
            assert!(ids.iter().all(|id| other.instance(id).is_none()));
        }
    }
}

#[test]
fn threads_can_share_one_ledger() {
    let ontology = Arc::new(ontology());
    let shared = SessionLedger::new();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ontology = Arc::clone(&ontology);
            let shared = shared.clone();
            thread::spawn(move || {
                let _scope = shared.enter();
                for _ in 0..5 {
                    let country = ontology.instantiate("Country").unwrap().build().unwrap();
                    country.assign("capital", Iri::generate()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.instance_count(), 20);
    assert_eq!(shared.assertion_count(), 20);
    // One type statement plus one capital per instance.
    assert_eq!(shared.statements().iter().count(), 40);
}

#[test]
fn synthesis_records_types_in_the_current_scope() {
    let (ontology, ledger) = session::with_scope(|_| Ontology::load(&schema(), &OntologyConfig::default()).unwrap());
    assert_eq!(ledger.types().len(), ontology.types().len());
}
