//! Values a property can hold.
//!
//! A value is either a reference (to a constructed instance, or to an external
//! resource known only by IRI) or a literal. Literals keep a typed payload plus
//! an optional language tag, which only string literals may carry.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::instance::Instance;
use crate::iri::Iri;
use crate::synthesis::SynthesizedType;
use crate::vocab::{rdf, rdfs, xsd};

const LANGUAGE_TAG_PATTERN: &str = r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$";

static LANGUAGE_TAG: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Validates a BCP 47 language tag and returns its lower-cased form.
///
/// Tags compare case-insensitively, so every stored tag is normalised.
pub fn normalize_language_tag(tag: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidLanguageTag {
        tag: tag.to_string(),
    };
    let pattern = LANGUAGE_TAG
        .get_or_init(|| Regex::new(LANGUAGE_TAG_PATTERN))
        .as_ref()
        .map_err(|_| invalid())?;
    if pattern.is_match(tag) {
        Ok(tag.to_ascii_lowercase())
    } else {
        Err(invalid())
    }
}

/// Typed payload of a literal.
///
/// Doubles compare by bit pattern, so `NaN` equals itself and `0.0` differs
/// from `-0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// `xsd:string`, or `rdf:langString` once tagged.
    String(String),
    /// The XSD integer family.
    Integer(i64),
    /// `xsd:double`, `xsd:float` and `xsd:decimal`.
    Double(f64),
    /// `xsd:boolean`.
    Boolean(bool),
    /// `xsd:dateTime`, normalised to UTC.
    DateTime(DateTime<Utc>),
    /// A literal whose datatype has no native representation.
    Typed {
        /// Lexical form, kept verbatim.
        lexical: String,
        /// Declared datatype IRI.
        datatype: Iri,
    },
}

impl LiteralValue {
    /// Parses a lexical form according to its datatype.
    ///
    /// Unknown datatypes, and lexical forms that do not parse as their
    /// declared datatype, are kept verbatim as [`LiteralValue::Typed`].
    #[must_use]
    pub fn from_lexical(lexical: &str, datatype: Option<&Iri>) -> Self {
        let Some(datatype) = datatype else {
            return Self::String(lexical.to_string());
        };
        let typed = || Self::Typed {
            lexical: lexical.to_string(),
            datatype: datatype.clone(),
        };

        match Datatype::from_iri(datatype.as_str()) {
            Some(Datatype::String | Datatype::LangString) => Self::String(lexical.to_string()),
            Some(Datatype::Boolean) => match lexical.trim() {
                "true" | "1" => Self::Boolean(true),
                "false" | "0" => Self::Boolean(false),
                _ => typed(),
            },
            Some(Datatype::Integer) => lexical.trim().parse().map_or_else(|_| typed(), Self::Integer),
            Some(Datatype::Double) => lexical.trim().parse().map_or_else(|_| typed(), Self::Double),
            Some(Datatype::DateTime) => DateTime::parse_from_rfc3339(lexical.trim())
                .map_or_else(|_| typed(), |dt| Self::DateTime(dt.with_timezone(&Utc))),
            Some(Datatype::Any | Datatype::Custom(_)) | None => typed(),
        }
    }

    /// Returns the datatype IRI this payload serialises with.
    #[must_use]
    pub fn datatype(&self) -> Iri {
        match self {
            Self::String(_) => Iri::trusted(xsd::STRING),
            Self::Integer(_) => Iri::trusted(xsd::INTEGER),
            Self::Double(_) => Iri::trusted(xsd::DOUBLE),
            Self::Boolean(_) => Iri::trusted(xsd::BOOLEAN),
            Self::DateTime(_) => Iri::trusted(xsd::DATE_TIME),
            Self::Typed { datatype, .. } => datatype.clone(),
        }
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn lexical(&self) -> String {
        match self {
            Self::String(v) => v.clone(),
            Self::Integer(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Boolean(v) => v.to_string(),
            Self::DateTime(v) => v.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Typed { lexical, .. } => lexical.clone(),
        }
    }

    /// Returns a human-readable kind name.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "dateTime",
            Self::Typed { .. } => "typed",
        }
    }
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (
                Self::Typed { lexical, datatype },
                Self::Typed {
                    lexical: other_lexical,
                    datatype: other_datatype,
                },
            ) => lexical == other_lexical && datatype == other_datatype,
            _ => false,
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for LiteralValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for LiteralValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for LiteralValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

/// A literal value with an optional language tag.
///
/// # Examples
///
/// ```
/// use ontoledger::Literal;
///
/// let hello = Literal::tagged("Bonjour", "FR").unwrap();
/// assert_eq!(hello.language(), Some("fr"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LiteralRepr", into = "LiteralRepr")]
pub struct Literal {
    value: LiteralValue,
    language: Option<String>,
}

/// Wire form of [`Literal`]; deserialised tags go through the same checks
/// as [`Literal::with_language`].
#[derive(Serialize, Deserialize)]
struct LiteralRepr {
    value: LiteralValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl TryFrom<LiteralRepr> for Literal {
    type Error = ValidationError;

    fn try_from(repr: LiteralRepr) -> Result<Self, Self::Error> {
        let literal = Self::new(repr.value);
        match repr.language {
            Some(tag) => literal.with_language(&tag),
            None => Ok(literal),
        }
    }
}

impl From<Literal> for LiteralRepr {
    fn from(literal: Literal) -> Self {
        Self {
            value: literal.value,
            language: literal.language,
        }
    }
}

impl Literal {
    /// Creates an untagged literal.
    #[must_use]
    pub fn new(value: impl Into<LiteralValue>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    /// Creates a language-tagged string literal.
    pub fn tagged(text: impl Into<String>, language: &str) -> Result<Self, ValidationError> {
        Self::new(text.into()).with_language(language)
    }

    /// Builds a literal from the parts a triple source reports.
    pub fn from_parts(
        lexical: &str,
        datatype: Option<&Iri>,
        language: Option<&str>,
    ) -> Result<Self, ValidationError> {
        match language {
            Some(tag) => Self::tagged(lexical, tag),
            None => Ok(Self::new(LiteralValue::from_lexical(lexical, datatype))),
        }
    }

    /// Attaches a language tag. Only string literals can be tagged.
    pub fn with_language(mut self, language: &str) -> Result<Self, ValidationError> {
        if !matches!(self.value, LiteralValue::String(_)) {
            return Err(ValidationError::UntaggableValue {
                value: self.describe(),
            });
        }
        self.language = Some(normalize_language_tag(language)?);
        Ok(self)
    }

    /// Returns the typed payload.
    #[must_use]
    pub const fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// Returns the normalised language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the datatype IRI (`rdf:langString` for tagged strings).
    #[must_use]
    pub fn datatype(&self) -> Iri {
        if self.language.is_some() {
            Iri::trusted(rdf::LANG_STRING)
        } else {
            self.value.datatype()
        }
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn lexical(&self) -> String {
        self.value.lexical()
    }

    /// Converts into an `oxrdf` literal.
    #[must_use]
    pub fn to_oxrdf(&self) -> oxrdf::Literal {
        match &self.language {
            Some(language) => {
                oxrdf::Literal::new_language_tagged_literal_unchecked(self.lexical(), language.clone())
            }
            None => match &self.value {
                LiteralValue::String(v) => oxrdf::Literal::new_simple_literal(v.clone()),
                other => oxrdf::Literal::new_typed_literal(other.lexical(), other.datatype().to_named_node()),
            },
        }
    }

    fn describe(&self) -> String {
        match &self.language {
            Some(language) => format!("{} literal {:?}@{language}", self.value.kind_name(), self.lexical()),
            None => format!("{} literal {:?}", self.value.kind_name(), self.lexical()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.language, &self.value) {
            (Some(language), _) => write!(f, "{:?}@{language}", self.lexical()),
            (None, LiteralValue::String(v)) => write!(f, "{v:?}"),
            (None, other) => write!(f, "{:?}^^<{}>", other.lexical(), other.datatype()),
        }
    }
}

/// Literal datatypes a property range can demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// `rdfs:Literal`: any literal.
    Any,
    /// `xsd:string`: any string literal, tagged or not.
    String,
    /// `rdf:langString`: language-tagged strings only.
    LangString,
    /// `xsd:boolean`.
    Boolean,
    /// The XSD integer family.
    Integer,
    /// `xsd:decimal`, `xsd:float` and `xsd:double`; integers are accepted too.
    Double,
    /// `xsd:dateTime`.
    DateTime,
    /// Any other datatype, matched by IRI against typed literals.
    Custom(Iri),
}

impl Datatype {
    /// Recognises the built-in literal datatypes.
    ///
    /// Returns `None` for IRIs outside the XSD namespace that are not
    /// `rdfs:Literal` or `rdf:langString`.
    #[must_use]
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            rdfs::LITERAL => Some(Self::Any),
            rdf::LANG_STRING => Some(Self::LangString),
            xsd::STRING => Some(Self::String),
            xsd::BOOLEAN => Some(Self::Boolean),
            xsd::DECIMAL | xsd::DOUBLE | xsd::FLOAT => Some(Self::Double),
            xsd::DATE_TIME => Some(Self::DateTime),
            other => {
                let local = other.strip_prefix(xsd::NS)?;
                if xsd::INTEGER_FAMILY.contains(&local) {
                    Some(Self::Integer)
                } else {
                    Some(Self::Custom(Iri::trusted(other)))
                }
            }
        }
    }

    /// Returns true if `literal` belongs to this datatype.
    #[must_use]
    pub fn accepts(&self, literal: &Literal) -> bool {
        match (self, literal.value()) {
            (Self::Any, _)
            | (Self::String, LiteralValue::String(_))
            | (Self::Boolean, LiteralValue::Boolean(_))
            | (Self::Integer, LiteralValue::Integer(_))
            | (Self::Double, LiteralValue::Double(_) | LiteralValue::Integer(_))
            | (Self::DateTime, LiteralValue::DateTime(_)) => true,
            (Self::LangString, LiteralValue::String(_)) => literal.language().is_some(),
            (Self::Custom(expected), LiteralValue::Typed { datatype, .. }) => expected == datatype,
            _ => false,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any literal"),
            Self::String => write!(f, "string literal"),
            Self::LangString => write!(f, "language-tagged string"),
            Self::Boolean => write!(f, "boolean literal"),
            Self::Integer => write!(f, "integer literal"),
            Self::Double => write!(f, "numeric literal"),
            Self::DateTime => write!(f, "dateTime literal"),
            Self::Custom(iri) => write!(f, "literal of <{iri}>"),
        }
    }
}

/// Typed reference to a constructed instance.
///
/// Two references are equal when they name the same instance.
#[derive(Clone)]
pub struct InstanceRef {
    id: Iri,
    class: Arc<SynthesizedType>,
}

impl InstanceRef {
    pub(crate) fn new(id: Iri, class: Arc<SynthesizedType>) -> Self {
        Self { id, class }
    }

    /// Returns the referenced instance's identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the referenced instance's type.
    #[must_use]
    pub fn class(&self) -> &Arc<SynthesizedType> {
        &self.class
    }
}

impl PartialEq for InstanceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRef")
            .field("id", &self.id)
            .field("class", self.class.id())
            .finish()
    }
}

/// Possible values of a property.
///
/// # Examples
///
/// ```
/// use ontoledger::{Iri, Value};
///
/// let population = Value::from(1_412_000_000_i64);
/// let see_also = Value::from(Iri::new("https://en.wikipedia.org/wiki/China").unwrap());
///
/// assert!(population.is_literal());
/// assert!(see_also.is_reference());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Another instance constructed from the same ontology.
    Instance(InstanceRef),
    /// An IRI that names no known instance.
    Resource(Iri),
    /// A typed or language-tagged literal.
    Literal(Literal),
}

impl Value {
    /// Returns true for literal values.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns true for instance and resource references.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Instance(_) | Self::Resource(_))
    }

    /// Returns the literal, if this is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the instance reference, if this is one.
    #[must_use]
    pub const fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Self::Instance(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the referenced IRI for instance and resource values.
    pub const fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Instance(v) => Some(&v.id),
            Self::Resource(v) => Some(v),
            Self::Literal(_) => None,
        }
    }

    /// Returns the language tag of a tagged literal.
    pub fn language(&self) -> Option<&str> {
        self.as_literal().and_then(Literal::language)
    }

    /// Tags a string literal with a language.
    pub fn with_language(self, language: &str) -> Result<Self, ValidationError> {
        match self {
            Self::Literal(literal) => Ok(Self::Literal(literal.with_language(language)?)),
            other => Err(ValidationError::UntaggableValue {
                value: other.describe(),
            }),
        }
    }

    /// Compares payloads, ignoring any language tag.
    #[must_use]
    pub fn same_payload(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a.value() == b.value(),
            (Self::Instance(a), Self::Instance(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => a == b,
            _ => false,
        }
    }

    /// Human-readable description used in validation errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Instance(v) => format!("instance <{}> of <{}>", v.id, v.class.id()),
            Self::Resource(v) => format!("resource <{v}>"),
            Self::Literal(v) => v.describe(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(v) => write!(f, "<{}>", v.id),
            Self::Resource(v) => write!(f, "<{v}>"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

impl From<Literal> for Value {
    fn from(v: Literal) -> Self {
        Self::Literal(v)
    }
}

impl From<Iri> for Value {
    fn from(v: Iri) -> Self {
        Self::Resource(v)
    }
}

impl From<InstanceRef> for Value {
    fn from(v: InstanceRef) -> Self {
        Self::Instance(v)
    }
}

impl From<&Instance> for Value {
    fn from(v: &Instance) -> Self {
        Self::Instance(v.reference())
    }
}

impl From<&Arc<Instance>> for Value {
    fn from(v: &Arc<Instance>) -> Self {
        Self::Instance(v.reference())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Literal(Literal::new(v))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Literal(Literal::new(v))
    }
}
