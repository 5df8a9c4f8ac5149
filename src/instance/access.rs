//! Property descriptor bound to one instance.

use std::sync::Arc;

use crate::error::ValidationError;
use crate::instance::Instance;
use crate::iri::Iri;
use crate::synthesis::PropertySpec;
use crate::value::{normalize_language_tag, Value};

/// Mediates reads and writes of one property on one instance.
///
/// Reads apply the implication rule: values asserted through any
/// sub-property are visible here, never the other way round.
///
/// # Examples
///
/// ```
/// use ontoledger::{Iri, Ontology, OntologyConfig, SessionLedger, Triple};
///
/// let ex = |name: &str| Iri::new(format!("http://ex.org/{name}")).unwrap();
/// let rdf_type = Iri::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type").unwrap();
/// let schema = vec![
///     Triple::new(ex("Country"), rdf_type.clone(), Iri::new("http://www.w3.org/2000/01/rdf-schema#Class").unwrap()),
/// ];
///
/// let ledger = SessionLedger::new();
/// let ontology = Ontology::load_in(&schema, &OntologyConfig::default(), &ledger).unwrap();
/// let china = ontology.instantiate("Country").unwrap().build_in(&ledger).unwrap();
///
/// let label = china.property("label").unwrap();
/// label.assign_lang("Chine", "fr").unwrap();
/// label.assign("China").unwrap();
///
/// assert!(label.contains("Chine"));
/// assert!(label.contains_lang("Chine", "fr").unwrap());
/// assert_eq!(label.values_in("fr").unwrap().len(), 1);
/// assert_eq!(label.values().len(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct PropertyAccess<'a> {
    instance: &'a Instance,
    spec: &'a Arc<PropertySpec>,
}

impl<'a> PropertyAccess<'a> {
    pub(crate) fn new(instance: &'a Instance, spec: &'a Arc<PropertySpec>) -> Self {
        Self { instance, spec }
    }

    /// The resolved property.
    #[must_use]
    pub fn spec(&self) -> &'a Arc<PropertySpec> {
        self.spec
    }

    /// Validates `value` against the resolved range and adds it.
    ///
    /// Assigning a value that is already present changes nothing. A new
    /// value is reported to the ledger that recorded the instance.
    ///
    /// # Errors
    /// `RangeMismatch` if the value falls outside the range; nothing is
    /// stored or recorded in that case.
    pub fn assign(&self, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        self.spec.check(&value)?;

        let added = self
            .instance
            .write()
            .entry(self.spec.id().clone())
            .or_default()
            .insert(value.clone());

        if added {
            if let Some(ledger) = self.instance.ledger() {
                ledger.record_assertion(self.instance.id(), self.spec.id(), &value);
            }
        }
        Ok(())
    }

    /// Assigns a language-tagged string.
    ///
    /// # Errors
    /// `InvalidLanguageTag` for a malformed tag, otherwise as [`Self::assign`].
    pub fn assign_lang(&self, text: impl Into<String>, language: &str) -> Result<(), ValidationError> {
        self.assign(Value::from(text.into()).with_language(language)?)
    }

    /// Returns true if `value` was asserted through this property or any
    /// of its sub-properties.
    #[must_use]
    pub fn contains(&self, value: impl Into<Value>) -> bool {
        let candidate = value.into();
        let values = self.instance.read();
        self.reflected()
            .filter_map(|property| values.get(property))
            .any(|set| set.contains(&candidate))
    }

    /// Returns true if the string was asserted with exactly this language.
    pub fn contains_lang(&self, text: impl Into<String>, language: &str) -> Result<bool, ValidationError> {
        Ok(self.contains(Value::from(text.into()).with_language(language)?))
    }

    /// Every visible value: own assertions first, then each sub-property's,
    /// each in insertion order, without repeats.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.collect(|_| true)
    }

    /// Visible literals tagged with `language`.
    ///
    /// # Errors
    /// `InvalidLanguageTag` for a malformed tag.
    pub fn values_in(&self, language: &str) -> Result<Vec<Value>, ValidationError> {
        let language = normalize_language_tag(language)?;
        Ok(self.collect(|value| value.language() == Some(language.as_str())))
    }

    fn reflected(&self) -> impl Iterator<Item = &'a Iri> {
        let spec: &'a PropertySpec = self.spec;
        std::iter::once(spec.id()).chain(spec.sub_properties().iter())
    }

    fn collect(&self, keep: impl Fn(&Value) -> bool) -> Vec<Value> {
        let values = self.instance.read();
        let mut out: Vec<Value> = Vec::new();
        for set in self.reflected().filter_map(|property| values.get(property)) {
            for value in set.iter().filter(|value| keep(value)) {
                if !out.contains(value) {
                    out.push(value.clone());
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for PropertyAccess<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyAccess")
            .field("instance", self.instance.id())
            .field("property", self.spec.id())
            .finish()
    }
}
