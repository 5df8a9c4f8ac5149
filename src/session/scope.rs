//! Per-thread stack of current ledgers.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::session::ledger::SessionLedger;

thread_local! {
    static STACK: RefCell<Vec<SessionLedger>> = const { RefCell::new(Vec::new()) };
}

/// Returns the top of this thread's scope stack.
pub(crate) fn innermost() -> Option<SessionLedger> {
    STACK
        .try_with(|stack| stack.borrow().last().cloned())
        .ok()
        .flatten()
}

/// Guard keeping a ledger current on this thread.
///
/// Dropping the guard (including during unwinding) pops the ledger and
/// restores whichever ledger was current before. The guard is tied to the
/// thread that created it and cannot be sent elsewhere.
#[derive(Debug)]
pub struct SessionScope {
    ledger: SessionLedger,
    depth: usize,
    _thread_bound: PhantomData<Rc<()>>,
}

impl SessionScope {
    pub(crate) fn enter(ledger: SessionLedger) -> Self {
        let depth = STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(ledger.clone());
            stack.len()
        });
        tracing::debug!(ledger = %ledger.id(), depth, "session scope entered");
        Self {
            ledger,
            depth,
            _thread_bound: PhantomData,
        }
    }

    /// The ledger this scope made current.
    #[must_use]
    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Ends the scope and hands back its ledger for inspection.
    #[must_use]
    pub fn exit(self) -> SessionLedger {
        self.ledger.clone()
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        let id = self.ledger.id();
        // Guards normally drop in reverse order; tolerate out-of-order drops
        // by removing this scope's own entry.
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            let slot = if stack.len() == self.depth && stack.last().is_some_and(|top| top.id() == id) {
                Some(self.depth - 1)
            } else {
                stack.iter().rposition(|entry| entry.id() == id)
            };
            if let Some(slot) = slot {
                stack.remove(slot);
            }
        });
        tracing::debug!(ledger = %id, depth = self.depth, "session scope exited");
    }
}

/// Runs `f` with a fresh ledger current, then returns its result together
/// with the ledger.
///
/// # Examples
///
/// ```
/// use ontoledger::session::with_scope;
/// use ontoledger::SessionLedger;
///
/// let (inner_id, ledger) = with_scope(|ledger| ledger.id());
/// assert_eq!(inner_id, ledger.id());
/// assert_ne!(SessionLedger::current().id(), ledger.id());
/// ```
pub fn with_scope<T>(f: impl FnOnce(&SessionLedger) -> T) -> (T, SessionLedger) {
    let scope = SessionLedger::scoped();
    let out = f(scope.ledger());
    (out, scope.exit())
}
