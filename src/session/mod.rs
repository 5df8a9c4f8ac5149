//! Session ledgers.
//!
//! A [`SessionLedger`] records every type synthesized and every instance
//! constructed while it is current, and can stream them back out as
//! statements. Each thread has its own stack of scoped ledgers; with no scope
//! active the process-wide ledger is current.
//!
//! Explicit handles are the primary API (`load_in`, `build_in`); the ambient
//! current ledger is a convenience layered on top.

mod export;
mod ledger;
mod scope;

pub use export::{Statement, StatementIter, Statements};
pub use ledger::SessionLedger;
pub(crate) use ledger::WeakLedger;
pub use scope::{with_scope, SessionScope};
