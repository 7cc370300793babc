//! Payload - Helpers shared by typed vendor API payloads
//!
//! Payloads are plain serde structs whose fields are all optional, so that an
//! update request can carry only what changed. Nested substructures are
//! allocated through [`ensure`] and nowhere else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A typed vendor API request/response object
pub trait Payload: Default + Send + Sync {
    /// The vendor-assigned ID, if known
    fn identity(&self) -> Option<&str>;

    /// An otherwise empty payload addressing an existing object
    fn with_identity(id: &str) -> Self;
}

/// Allocate a nested substructure if missing and return it
///
/// Idempotent: a substructure that already exists is returned untouched, so
/// fields populating siblings of the same parent never clobber each other.
pub fn ensure<T: Default>(slot: &mut Option<T>) -> &mut T {
    slot.get_or_insert_with(T::default)
}

/// A payload field that distinguishes "not sent" from "sent as null"
///
/// `Unset` is omitted when serializing (pair it with
/// `#[serde(default, skip_serializing_if = "Nullable::is_unset")]`), `Null`
/// serializes as `null` and asks the API to clear the remote attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Nullable<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Nullable::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn as_ref(&self) -> Nullable<&T> {
        match self {
            Nullable::Unset => Nullable::Unset,
            Nullable::Null => Nullable::Null,
            Nullable::Value(v) => Nullable::Value(v),
        }
    }

    /// The value, if one is present
    pub fn value(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` becomes a value, `None` an explicit null
    pub fn set(&mut self, value: Option<T>) {
        *self = match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        };
    }

    /// Like [`ensure`], for a nullable substructure
    pub fn ensure(&mut self) -> &mut T
    where
        T: Default,
    {
        if !matches!(self, Nullable::Value(_)) {
            *self = Nullable::Value(T::default());
        }
        match self {
            Nullable::Value(v) => v,
            _ => unreachable!("value assigned above"),
        }
    }
}

impl<T: Clone> Nullable<T> {
    pub fn cloned_value(&self) -> Option<T> {
        self.value().cloned()
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Value(v) => serializer.serialize_some(v),
            Nullable::Unset | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}

/// Apply a sparse payload on top of a full one, as the vendor's update call does
///
/// Only fields present in `patch` are written; `Nullable::Null` clears.
pub trait Merge {
    fn merge(&mut self, patch: Self);
}

/// Merge helper for plain optional fields
pub fn merge_option<T>(target: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *target = patch;
    }
}

/// Merge helper for nested optional structs
pub fn merge_nested<T: Merge + Default>(target: &mut Option<T>, patch: Option<T>) {
    if let Some(patch) = patch {
        ensure(target).merge(patch);
    }
}

/// Merge helper for nullable fields
pub fn merge_nullable<T>(target: &mut Nullable<T>, patch: Nullable<T>) {
    if !patch.is_unset() {
        *target = patch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Spec {
        #[serde(skip_serializing_if = "Option::is_none")]
        image_id: Option<String>,
        #[serde(default, skip_serializing_if = "Nullable::is_unset")]
        user_data: Nullable<String>,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Parent {
        spec: Option<Spec>,
    }

    #[test]
    fn ensure_is_idempotent() {
        let mut parent = Parent::default();
        ensure(&mut parent.spec).image_id = Some("ami-1".to_string());
        ensure(&mut parent.spec).user_data.set(Some("echo".to_string()));

        let spec = parent.spec.unwrap();
        assert_eq!(spec.image_id.as_deref(), Some("ami-1"));
        assert_eq!(spec.user_data, Nullable::Value("echo".to_string()));
    }

    #[test]
    fn nullable_serialization() {
        let unset = Spec::default();
        assert_eq!(serde_json::to_value(&unset).unwrap(), serde_json::json!({}));

        let cleared = Spec {
            user_data: Nullable::Null,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            serde_json::json!({ "userData": null })
        );

        let set = Spec {
            user_data: Nullable::Value("echo".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            serde_json::json!({ "userData": "echo" })
        );
    }

    #[test]
    fn nullable_deserialization() {
        let spec: Spec = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(spec.user_data.is_unset());

        let spec: Spec = serde_json::from_value(serde_json::json!({ "userData": null })).unwrap();
        assert!(spec.user_data.is_null());

        let spec: Spec = serde_json::from_value(serde_json::json!({ "userData": "x" })).unwrap();
        assert_eq!(spec.user_data.value().map(String::as_str), Some("x"));
    }

    #[test]
    fn nullable_ensure_replaces_null() {
        let mut field: Nullable<Spec> = Nullable::Null;
        field.ensure().image_id = Some("ami-2".to_string());
        field.ensure().user_data.set(None);

        let spec = field.into_option().unwrap();
        assert_eq!(spec.image_id.as_deref(), Some("ami-2"));
        assert!(spec.user_data.is_null());
    }

    #[test]
    fn merge_helpers() {
        let mut opt = Some(1);
        merge_option(&mut opt, None);
        assert_eq!(opt, Some(1));
        merge_option(&mut opt, Some(2));
        assert_eq!(opt, Some(2));

        let mut nullable = Nullable::Value("a");
        merge_nullable(&mut nullable, Nullable::Unset);
        assert_eq!(nullable, Nullable::Value("a"));
        merge_nullable(&mut nullable, Nullable::Null);
        assert!(nullable.is_null());
    }
}
