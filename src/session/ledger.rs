//! The session ledger: every type and instance created while it was current.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use uuid::Uuid;

use crate::config::ExportConfig;
use crate::error::ValidationError;
use crate::instance::Instance;
use crate::iri::Iri;
use crate::session::export::Statements;
use crate::session::scope::{self, SessionScope};
use crate::synthesis::SynthesizedType;
use crate::value::Value;

static GLOBAL: OnceLock<SessionLedger> = OnceLock::new();

#[derive(Debug, Default)]
struct LedgerState {
    types: Vec<Arc<SynthesizedType>>,
    type_ids: HashSet<Iri>,
    instances: Vec<Arc<Instance>>,
    instance_index: HashMap<Iri, usize>,
}

#[derive(Debug)]
pub(crate) struct LedgerInner {
    id: Uuid,
    state: RwLock<LedgerState>,
    assertions: AtomicU64,
}

/// Registry of synthesized types and constructed instances.
///
/// Cheap to clone: clones share the same recorded state. Recorded state is
/// append-only, so a lock poisoned by a panicking writer still guards a
/// consistent prefix and is recovered rather than propagated.
///
/// # Examples
///
/// ```
/// use ontoledger::SessionLedger;
///
/// let scope = SessionLedger::scoped();
/// assert_eq!(SessionLedger::current(), *scope.ledger());
/// let ledger = scope.exit();
/// assert_ne!(SessionLedger::current(), ledger);
/// ```
#[derive(Clone)]
pub struct SessionLedger {
    inner: Arc<LedgerInner>,
}

impl SessionLedger {
    /// Creates an empty ledger that is not current anywhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                id: Uuid::new_v4(),
                state: RwLock::new(LedgerState::default()),
                assertions: AtomicU64::new(0),
            }),
        }
    }

    /// The process-wide ledger, current whenever no scope is active.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// The innermost scoped ledger of this thread, or the global one.
    #[must_use]
    pub fn current() -> Self {
        scope::innermost().unwrap_or_else(Self::global)
    }

    /// Opens a fresh ledger and makes it current on this thread until the
    /// returned guard is dropped.
    #[must_use = "the scope ends as soon as the guard is dropped"]
    pub fn scoped() -> SessionScope {
        SessionScope::enter(Self::new())
    }

    /// Makes this ledger current on this thread until the guard is dropped.
    ///
    /// This is how several threads share one ledger.
    #[must_use = "the scope ends as soon as the guard is dropped"]
    pub fn enter(&self) -> SessionScope {
        SessionScope::enter(self.clone())
    }

    /// Returns the ledger identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recorded types in recording order.
    #[must_use]
    pub fn types(&self) -> Vec<Arc<SynthesizedType>> {
        self.read().types.clone()
    }

    /// Recorded instances in construction order.
    #[must_use]
    pub fn instances(&self) -> Vec<Arc<Instance>> {
        self.read().instances.clone()
    }

    /// Looks up a recorded instance.
    #[must_use]
    pub fn instance(&self, id: &Iri) -> Option<Arc<Instance>> {
        let state = self.read();
        state.instance_index.get(id).map(|idx| Arc::clone(&state.instances[*idx]))
    }

    /// Number of recorded instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.read().instances.len()
    }

    pub(crate) fn instance_at(&self, idx: usize) -> Option<Arc<Instance>> {
        self.read().instances.get(idx).cloned()
    }

    /// Number of value assertions recorded against this ledger's instances.
    #[must_use]
    pub fn assertion_count(&self) -> u64 {
        self.inner.assertions.load(Ordering::Relaxed)
    }

    /// Streams every recorded assertion with the default export settings.
    #[must_use]
    pub fn statements(&self) -> Statements {
        self.statements_with(ExportConfig::default())
    }

    /// Streams every recorded assertion with explicit export settings.
    #[must_use]
    pub fn statements_with(&self, config: ExportConfig) -> Statements {
        Statements::new(self.clone(), config)
    }

    /// Records a type. Recording a type IRI twice keeps the first.
    pub(crate) fn record_type(&self, ty: &Arc<SynthesizedType>) {
        let mut state = self.write();
        if state.type_ids.insert(ty.id().clone()) {
            state.types.push(Arc::clone(ty));
        }
    }

    /// Records one instance; see [`Self::record_instances`].
    pub(crate) fn record_instance(&self, instance: &Arc<Instance>) -> Result<(), ValidationError> {
        self.record_instances(std::slice::from_ref(instance))
    }

    /// Records a batch of instances atomically.
    ///
    /// Re-recording an instance already in the ledger is a no-op. A different
    /// instance reusing a recorded identifier fails the whole batch.
    pub(crate) fn record_instances(&self, batch: &[Arc<Instance>]) -> Result<(), ValidationError> {
        let mut state = self.write();
        let mut fresh: Vec<&Arc<Instance>> = Vec::with_capacity(batch.len());
        let mut batch_ids: HashSet<&Iri> = HashSet::with_capacity(batch.len());

        for instance in batch {
            match state.instance_index.get(instance.id()) {
                Some(idx) if Arc::ptr_eq(&state.instances[*idx], instance) => {}
                Some(_) => {
                    return Err(ValidationError::DuplicateInstance {
                        instance: instance.id().clone(),
                    })
                }
                None => {
                    if !batch_ids.insert(instance.id()) {
                        return Err(ValidationError::DuplicateInstance {
                            instance: instance.id().clone(),
                        });
                    }
                    fresh.push(instance);
                }
            }
        }

        let mut assertions = 0u64;
        for instance in fresh {
            let idx = state.instances.len();
            state.instance_index.insert(instance.id().clone(), idx);
            state.instances.push(Arc::clone(instance));
            instance.attach(self);
            assertions += instance.assertion_count();
        }
        drop(state);

        self.inner.assertions.fetch_add(assertions, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn record_assertion(&self, subject: &Iri, predicate: &Iri, value: &Value) {
        self.inner.assertions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            ledger = %self.inner.id,
            subject = %subject,
            predicate = %predicate,
            object = %value,
            "assertion recorded"
        );
    }

    pub(crate) fn downgrade(&self) -> WeakLedger {
        WeakLedger(Arc::downgrade(&self.inner))
    }
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SessionLedger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for SessionLedger {}

impl fmt::Debug for SessionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("SessionLedger")
            .field("id", &self.inner.id)
            .field("types", &state.types.len())
            .field("instances", &state.instances.len())
            .field("assertions", &self.assertion_count())
            .finish()
    }
}

/// Non-owning handle an instance keeps to the ledger that recorded it.
#[derive(Debug, Clone)]
pub(crate) struct WeakLedger(Weak<LedgerInner>);

impl WeakLedger {
    pub(crate) fn upgrade(&self) -> Option<SessionLedger> {
        self.0.upgrade().map(|inner| SessionLedger { inner })
    }
}
