use crate::value::Value;

/// Values assigned to one property of one instance.
///
/// Insertion-ordered; inserting a value equal to a stored one (payload and
/// language tag) is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: Vec<Value>,
}

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value. Returns false if it was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Membership test.
    ///
    /// An untagged candidate matches any stored value with the same payload,
    /// whatever its language; a tagged candidate must match exactly.
    #[must_use]
    pub fn contains(&self, candidate: &Value) -> bool {
        if candidate.language().is_some() {
            self.values.contains(candidate)
        } else {
            self.values.iter().any(|stored| stored.same_payload(candidate))
        }
    }

    /// Stored values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Literals tagged with `language`, in insertion order.
    pub fn in_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a Value> {
        self.values
            .iter()
            .filter(move |value| value.language() == Some(language))
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Literal;

    fn tagged(text: &str, lang: &str) -> Value {
        Value::from(Literal::tagged(text, lang).unwrap())
    }

    #[test]
    fn test_insert_collapses_duplicates() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::from("China")));
        assert!(!set.insert(Value::from("China")));
        assert!(set.insert(tagged("China", "en")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_nan_is_stored_once() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::from(f64::NAN)));
        assert!(!set.insert(Value::from(f64::NAN)));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Value::from(f64::NAN)));
    }

    #[test]
    fn test_contains_with_and_without_language() {
        let mut set = ValueSet::new();
        set.insert(tagged("Zhongguo", "zh"));

        assert!(set.contains(&Value::from("Zhongguo")));
        assert!(set.contains(&tagged("Zhongguo", "zh")));
        assert!(!set.contains(&tagged("Zhongguo", "en")));
        assert!(!set.contains(&Value::from("China")));
    }

    #[test]
    fn test_in_language_preserves_order() {
        let mut set = ValueSet::new();
        set.insert(tagged("Chine", "fr"));
        set.insert(Value::from("China"));
        set.insert(tagged("China", "en"));
        set.insert(tagged("Pays du milieu", "fr"));

        let french: Vec<String> = set.in_language("fr").map(ToString::to_string).collect();
        assert_eq!(french, vec!["\"Chine\"@fr", "\"Pays du milieu\"@fr"]);
        assert_eq!(set.iter().count(), 4);
    }
}
