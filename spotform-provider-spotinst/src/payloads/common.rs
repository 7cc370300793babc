//! Payload types shared by elastigroup and ocean

use serde::{Deserialize, Serialize};
use spotform_core::Merge;
use spotform_core::payload::merge_option;

/// Instance count bounds of a group or cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
    /// "instance" or "weight"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Merge for Capacity {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.minimum, patch.minimum);
        merge_option(&mut self.maximum, patch.maximum);
        merge_option(&mut self.target, patch.target);
        merge_option(&mut self.unit, patch.unit);
    }
}

/// A key/value tag in the API's list form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_key: String,
    pub tag_value: String,
}
