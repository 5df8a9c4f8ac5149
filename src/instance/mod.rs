//! Instances of synthesized types and their property values.
//!
//! Every read and write goes through a [`PropertyAccess`], which resolves the
//! property on the instance's type, validates assignments against the
//! resolved range and applies the subproperty implication rule on reads.

mod access;
mod builder;
mod value_set;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use access::PropertyAccess;
pub use builder::InstanceBuilder;
pub use value_set::ValueSet;

use crate::error::ValidationError;
use crate::iri::Iri;
use crate::session::{SessionLedger, WeakLedger};
use crate::synthesis::SynthesizedType;
use crate::value::{InstanceRef, Value};

/// One object constructed from a [`SynthesizedType`].
///
/// Instances are shared as `Arc<Instance>`; assignment takes `&self` and
/// serialises on an internal lock.
pub struct Instance {
    id: Iri,
    class: Arc<SynthesizedType>,
    values: RwLock<HashMap<Iri, ValueSet>>,
    ledger: OnceLock<WeakLedger>,
}

impl Instance {
    /// An instance not yet recorded in any ledger.
    pub(crate) fn detached(id: Iri, class: Arc<SynthesizedType>) -> Self {
        Self {
            id,
            class,
            values: RwLock::new(HashMap::new()),
            ledger: OnceLock::new(),
        }
    }

    pub(crate) fn attach(&self, ledger: &SessionLedger) {
        // An instance belongs to the first ledger that records it.
        let _ = self.ledger.set(ledger.downgrade());
    }

    /// Returns the instance identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the type this instance was built from.
    #[must_use]
    pub fn class(&self) -> &Arc<SynthesizedType> {
        &self.class
    }

    /// A typed reference suitable as another instance's property value.
    #[must_use]
    pub fn reference(&self) -> InstanceRef {
        InstanceRef::new(self.id.clone(), Arc::clone(&self.class))
    }

    /// The ledger that recorded this instance, if it is still alive.
    #[must_use]
    pub fn ledger(&self) -> Option<SessionLedger> {
        self.ledger.get().and_then(WeakLedger::upgrade)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<Iri, ValueSet>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<Iri, ValueSet>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves a property by display name or IRI.
    ///
    /// # Errors
    /// `UnknownProperty` if the type has no such property.
    pub fn property(&self, name: &str) -> Result<PropertyAccess<'_>, ValidationError> {
        self.class
            .property(name)
            .map(|spec| PropertyAccess::new(self, spec))
            .ok_or_else(|| ValidationError::UnknownProperty {
                class: self.class.id().clone(),
                property: name.to_string(),
            })
    }

    /// Assigns a value; see [`PropertyAccess::assign`].
    pub fn assign(&self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        self.property(name)?.assign(value)
    }

    /// Assigns a language-tagged string.
    pub fn assign_lang(&self, name: &str, text: impl Into<String>, language: &str) -> Result<(), ValidationError> {
        self.property(name)?.assign_lang(text, language)
    }

    /// Membership test; see [`PropertyAccess::contains`].
    pub fn contains(&self, name: &str, value: impl Into<Value>) -> Result<bool, ValidationError> {
        Ok(self.property(name)?.contains(value))
    }

    /// Tagged membership test; see [`PropertyAccess::contains_lang`].
    pub fn contains_lang(
        &self,
        name: &str,
        text: impl Into<String>,
        language: &str,
    ) -> Result<bool, ValidationError> {
        self.property(name)?.contains_lang(text, language)
    }

    /// All values visible through a property, in insertion order.
    pub fn values(&self, name: &str) -> Result<Vec<Value>, ValidationError> {
        Ok(self.property(name)?.values())
    }

    /// Values visible through a property tagged with `language`.
    pub fn values_in(&self, name: &str, language: &str) -> Result<Vec<Value>, ValidationError> {
        self.property(name)?.values_in(language)
    }

    /// Directly asserted values per property, in the type's property order.
    pub(crate) fn assertions(&self) -> Vec<(Iri, Vec<Value>)> {
        let values = self.read();
        self.class
            .properties()
            .iter()
            .filter_map(|spec| {
                let set = values.get(spec.id()).filter(|set| !set.is_empty())?;
                Some((spec.id().clone(), set.iter().cloned().collect()))
            })
            .collect()
    }

    pub(crate) fn assertion_count(&self) -> u64 {
        self.read().values().map(|set| set.len() as u64).sum()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("class", self.class.id())
            .field("values", &*self.read())
            .finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> a <{}>", self.id, self.class.id())
    }
}
