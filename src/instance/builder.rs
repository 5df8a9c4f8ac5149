//! Instance construction.

use std::sync::Arc;

use crate::error::ValidationError;
use crate::instance::Instance;
use crate::iri::Iri;
use crate::session::SessionLedger;
use crate::synthesis::SynthesizedType;
use crate::value::Value;

/// Builder for instances of one synthesized type.
///
/// Initial values are applied in the order given, exactly as if assigned
/// right after construction. The instance is recorded only if every one of
/// them validates.
///
/// # Example
/// ```rust,ignore
/// let china = ontology
///     .instantiate("Country")?
///     .id(Iri::new("http://example.org/geo#china")?)
///     .with("officialLanguage", &mandarin)
///     .with_lang("label", "Chine", "fr")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    class: Arc<SynthesizedType>,
    id: Option<Iri>,
    initial: Vec<(String, Value)>,
    error: Option<ValidationError>,
}

impl InstanceBuilder {
    /// Creates a builder for `class`.
    #[must_use]
    pub fn new(class: Arc<SynthesizedType>) -> Self {
        Self {
            class,
            id: None,
            initial: Vec::new(),
            error: None,
        }
    }

    /// Set the instance identifier (default: a fresh `urn:uuid:` IRI).
    #[must_use]
    pub fn id(mut self, id: Iri) -> Self {
        self.id = Some(id);
        self
    }

    /// Add an initial value for a property, by display name or IRI.
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial.push((property.into(), value.into()));
        self
    }

    /// Add an initial language-tagged string.
    ///
    /// An invalid tag is reported by [`Self::build`].
    #[must_use]
    pub fn with_lang(mut self, property: impl Into<String>, text: impl Into<String>, language: &str) -> Self {
        match Value::from(text.into()).with_language(language) {
            Ok(value) => self.initial.push((property.into(), value)),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Builds the instance and records it in the current ledger.
    ///
    /// Returns `ValidationError::UnknownProperty` or `RangeMismatch` for a
    /// bad initial value, `InvalidLanguageTag` for a bad tag and
    /// `DuplicateInstance` if the ledger already holds the identifier.
    pub fn build(self) -> Result<Arc<Instance>, ValidationError> {
        self.build_in(&SessionLedger::current())
    }

    /// Builds the instance and records it in `ledger`.
    pub fn build_in(self, ledger: &SessionLedger) -> Result<Arc<Instance>, ValidationError> {
        let instance = self.build_detached()?;
        ledger.record_instance(&instance)?;
        tracing::debug!(
            ledger = %ledger.id(),
            instance = %instance.id(),
            class = %instance.class().id(),
            "instance constructed"
        );
        Ok(instance)
    }

    /// Builds and validates without recording.
    pub(crate) fn build_detached(self) -> Result<Arc<Instance>, ValidationError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let id = self.id.unwrap_or_else(Iri::generate);
        let instance = Arc::new(Instance::detached(id, self.class));
        for (property, value) in self.initial {
            instance.assign(&property, value)?;
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{PropertySpec, RangeConstraint};
    use crate::value::Datatype;

    fn ex(name: &str) -> Iri {
        Iri::new(format!("http://ex.org/{name}")).unwrap()
    }

    fn country() -> Arc<SynthesizedType> {
        let mut population = PropertySpec::builtin(ex("population"), None, 0);
        population.builtin = false;
        population.range = vec![RangeConstraint::Datatype(Datatype::Integer)];
        let label = PropertySpec::builtin(Iri::new(crate::vocab::rdfs::LABEL).unwrap(), None, 1);
        Arc::new(SynthesizedType::assemble(
            ex("Country"),
            None,
            None,
            Vec::new(),
            vec![(0, Arc::new(population)), (1, Arc::new(label))],
            |a, b| a < b,
            0,
        ))
    }

    #[test]
    fn test_build_applies_initial_values_and_records() {
        let ledger = SessionLedger::new();
        let china = InstanceBuilder::new(country())
            .id(ex("china"))
            .with("population", 1_412_000_000_i64)
            .with_lang("label", "Chine", "fr")
            .build_in(&ledger)
            .unwrap();

        assert_eq!(china.id(), &ex("china"));
        assert!(china.contains("population", 1_412_000_000_i64).unwrap());
        assert!(china.contains_lang("label", "Chine", "fr").unwrap());
        assert_eq!(ledger.instance_count(), 1);
        assert_eq!(ledger.assertion_count(), 2);
        assert_eq!(china.ledger(), Some(ledger));
    }

    #[test]
    fn test_invalid_initial_value_records_nothing() {
        let ledger = SessionLedger::new();
        let err = InstanceBuilder::new(country())
            .with("population", "many")
            .build_in(&ledger)
            .unwrap_err();
        assert!(matches!(err, ValidationError::RangeMismatch { .. }));
        assert_eq!(ledger.instance_count(), 0);
        assert_eq!(ledger.assertion_count(), 0);
    }

    #[test]
    fn test_invalid_language_tag_surfaces_on_build() {
        let err = InstanceBuilder::new(country())
            .with_lang("label", "Chine", "fr_FR")
            .build_in(&SessionLedger::new())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLanguageTag { .. }));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ledger = SessionLedger::new();
        let a = InstanceBuilder::new(country()).build_in(&ledger).unwrap();
        let b = InstanceBuilder::new(country()).build_in(&ledger).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().as_str().starts_with("urn:uuid:"));
    }

    #[test]
    fn test_build_uses_current_ledger() {
        let scope = SessionLedger::scoped();
        let china = InstanceBuilder::new(country()).build().unwrap();
        let ledger = scope.exit();
        assert!(ledger.instance(china.id()).is_some());
        assert!(SessionLedger::global().instance(china.id()).is_none());
    }
}
