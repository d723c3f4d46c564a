//! Resolved attribute values and their merge law.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// A resolved attribute: one value, or several once sources disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Single(String),
    Many(BTreeSet<String>),
}

impl AttrValue {
    /// Every value, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AttrValue::Single(v) => vec![v.as_str()],
            AttrValue::Many(set) => set.iter().map(String::as_str).collect(),
        }
    }

    /// The single value, or the smallest one of a set.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttrValue::Single(v) => Some(v),
            AttrValue::Many(set) => set.iter().next().map(String::as_str),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            AttrValue::Single(v) => v == value,
            AttrValue::Many(set) => set.contains(value),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttrValue::Single(_) => 1,
            AttrValue::Many(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set union. A union holding one value collapses back to `Single`.
    pub fn union(&self, other: &AttrValue) -> AttrValue {
        let mut set: BTreeSet<String> = self.values().into_iter().map(str::to_string).collect();
        set.extend(other.values().into_iter().map(str::to_string));
        AttrValue::from_set(set)
    }

    fn from_set(mut set: BTreeSet<String>) -> AttrValue {
        if set.len() == 1 {
            if let Some(only) = set.pop_first() {
                return AttrValue::Single(only);
            }
        }
        AttrValue::Many(set)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Single(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Single(value)
    }
}

/// Attribute name (a shortened predicate) → value.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Add one value under `key`, unioning with what is already there.
pub fn insert_value(attributes: &mut Attributes, key: &str, value: impl Into<AttrValue>) {
    let value = value.into();
    let merged = match attributes.get(key) {
        Some(existing) => existing.union(&value),
        None => value,
    };
    attributes.insert(key.to_string(), merged);
}

/// Merge `other` into `into` in place.
pub fn absorb_attributes(into: &mut Attributes, other: &Attributes) {
    for (key, value) in other {
        insert_value(into, key, value.clone());
    }
}

/// Key-wise union of two attribute maps.
///
/// Commutative and associative; keys present in both become the union of
/// their values.
pub fn merge_attributes(a: &Attributes, b: &Attributes) -> Attributes {
    let mut merged = a.clone();
    absorb_attributes(&mut merged, b);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &[&str])]) -> Attributes {
        let mut out = Attributes::new();
        for (key, values) in pairs {
            for v in *values {
                insert_value(&mut out, key, *v);
            }
        }
        out
    }

    #[test]
    fn colliding_keys_become_sets() {
        let a = attrs(&[("foaf:name", &["Duras"])]);
        let b = attrs(&[("foaf:name", &["Marguerite Duras"]), ("foaf:gender", &["female"])]);
        let merged = merge_attributes(&a, &b);
        assert_eq!(merged["foaf:name"].len(), 2);
        assert!(merged["foaf:name"].contains("Duras"));
        assert_eq!(merged["foaf:gender"], AttrValue::Single("female".into()));
    }

    #[test]
    fn equal_values_stay_single() {
        let a = attrs(&[("foaf:gender", &["female"])]);
        let merged = merge_attributes(&a, &a);
        assert_eq!(merged, a);
    }

    #[test]
    fn merge_is_commutative() {
        let a = attrs(&[("x", &["1", "2"]), ("y", &["a"])]);
        let b = attrs(&[("x", &["3"]), ("z", &["b"])]);
        assert_eq!(merge_attributes(&a, &b), merge_attributes(&b, &a));
    }

    #[test]
    fn merge_is_associative() {
        let a = attrs(&[("x", &["1"])]);
        let b = attrs(&[("x", &["2"]), ("y", &["a"])]);
        let c = attrs(&[("x", &["1", "3"]), ("y", &["b"])]);
        assert_eq!(
            merge_attributes(&merge_attributes(&a, &b), &c),
            merge_attributes(&a, &merge_attributes(&b, &c))
        );
    }

    #[test]
    fn serializes_single_as_string_and_many_as_array() {
        let a = attrs(&[("x", &["1", "2"]), ("y", &["a"])]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"x":["1","2"],"y":"a"}"#);
    }
}
