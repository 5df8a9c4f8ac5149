//! IRI value object.
//!
//! Every schema node, property, type and instance is identified by an [`Iri`].
//! Construction validates the text with `oxrdf`, so downstream code never has
//! to re-check identifiers.

use std::fmt;
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TermError;

/// Validated, absolute IRI.
///
/// # Examples
///
/// ```
/// use ontoledger::Iri;
///
/// let iri = Iri::new("http://example.org/geo#Country").unwrap();
/// assert_eq!(iri.local_name(), "Country");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Validates and constructs a new IRI.
    pub fn new(value: impl Into<String>) -> Result<Self, TermError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| TermError::InvalidIri {
            value: value.clone(),
        })?;
        Ok(Self(value))
    }

    /// Mints a fresh `urn:uuid:` identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    /// Returns the underlying text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display name: the text after the last `#`, `/` or `:`.
    ///
    /// Falls back to the whole IRI when that tail is empty.
    #[must_use]
    pub fn local_name(&self) -> &str {
        let tail = self
            .0
            .rfind(['#', '/', ':'])
            .map_or(self.0.as_str(), |idx| &self.0[idx + 1..]);
        if tail.is_empty() {
            &self.0
        } else {
            tail
        }
    }

    /// Converts into an `oxrdf` named node.
    #[must_use]
    pub fn to_named_node(&self) -> NamedNode {
        NamedNode::new_unchecked(self.0.clone())
    }

    // Only for text that already came from a valid IRI or a vocabulary constant.
    pub(crate) fn trusted(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = TermError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Iri {
    type Error = TermError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

impl From<NamedNode> for Iri {
    fn from(node: NamedNode) -> Self {
        Self(node.into_string())
    }
}

impl From<&Iri> for NamedNode {
    fn from(iri: &Iri) -> Self {
        iri.to_named_node()
    }
}

impl PartialEq<str> for Iri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
