//! Conversions between configuration shapes and API shapes

use std::collections::BTreeMap;

use spotform_core::{Attributes, Configuration, Value};

use crate::payloads::Tag;

/// Build the API tag list from a configuration tag map
pub fn build_tags(tags: BTreeMap<String, String>) -> Vec<Tag> {
    tags.into_iter()
        .map(|(tag_key, tag_value)| Tag { tag_key, tag_value })
        .collect()
}

/// Parse the API tag list into a configuration tag map
///
/// A key repeated in the list keeps its last value.
pub fn parse_tags(tags: &[Tag]) -> BTreeMap<String, String> {
    tags.iter()
        .map(|t| (t.tag_key.clone(), t.tag_value.clone()))
        .collect()
}

/// Split an availability zone entry of the form `name[:subnet-id]`
pub fn split_zone(entry: &str) -> (String, Option<String>) {
    match entry.split_once(':') {
        Some((name, subnet)) if !subnet.is_empty() => (name.to_string(), Some(subnet.to_string())),
        Some((name, _)) => (name.to_string(), None),
        None => (entry.to_string(), None),
    }
}

/// Inverse of [`split_zone`]
pub fn join_zone(name: &str, subnet_id: Option<&str>) -> String {
    match subnet_id {
        Some(subnet) => format!("{}:{}", name, subnet),
        None => name.to_string(),
    }
}

/// Insert `key` into a flattened block only when the payload has a value
pub fn insert_present<T: Into<Value>>(
    block: &mut BTreeMap<String, Value>,
    key: &str,
    value: Option<T>,
) {
    if let Some(value) = value {
        block.insert(key.to_string(), value.into());
    }
}

/// Whether a block attribute differs from prior state
///
/// An empty block list and an absent attribute compare equal.
pub fn block_changed(config: &Configuration, path: &str) -> bool {
    fn meaningful(value: Option<&Value>) -> Option<&Value> {
        value.filter(|v| !matches!(v, Value::List(items) if items.is_empty()))
    }
    meaningful(config.lookup(path)) != meaningful(config.lookup_prior(path))
}
