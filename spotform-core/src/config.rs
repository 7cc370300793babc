//! Configuration - Typed access to one resource instance's flat attributes
//!
//! The host framework supplies a fresh `Configuration` per lifecycle call.
//! It carries the current attribute values (the planned configuration on
//! create/update, the persisted state on read), the prior persisted values
//! used for change detection, and the instance ID.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::value::Value;

/// A Rust type that can be read from and written to a configuration value
pub trait ConfigValue: Sized + Clone + PartialEq {
    /// Type name used in mismatch errors
    const TYPE_NAME: &'static str;

    /// Convert from a value; `None` on type mismatch
    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;

    /// The representation written to state when the payload holds nothing
    fn zero() -> Value;

    /// Whether a present value still means "not set"
    ///
    /// Empty strings are treated as unset so that a cleared string attribute
    /// is never expanded into the payload.
    fn is_unset(&self) -> bool {
        false
    }
}

impl ConfigValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn zero() -> Value {
        Value::String(String::new())
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl ConfigValue for i64 {
    const TYPE_NAME: &'static str = "Int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn zero() -> Value {
        Value::Int(0)
    }
}

impl ConfigValue for f64 {
    const TYPE_NAME: &'static str = "Float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn zero() -> Value {
        Value::Float(0.0)
    }
}

impl ConfigValue for bool {
    const TYPE_NAME: &'static str = "Bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn zero() -> Value {
        Value::Bool(false)
    }
}

impl ConfigValue for Vec<String> {
    const TYPE_NAME: &'static str = "List<String>";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(String::from_value).collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Value::String).collect())
    }

    fn zero() -> Value {
        Value::List(Vec::new())
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl ConfigValue for BTreeMap<String, String> {
    const TYPE_NAME: &'static str = "Map<String>";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| String::from_value(v).map(|s| (k.clone(), s)))
                .collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }

    fn zero() -> Value {
        Value::Map(BTreeMap::new())
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Read access to a set of attributes by path
pub trait Attributes {
    /// Resolve a dot-separated path; `Null` reads as absent
    fn lookup(&self, path: &str) -> Option<&Value>;

    /// Typed read. Absent and `Null` are `Ok(None)`, a value of another type
    /// is a [`ConfigError::TypeMismatch`].
    fn get_as<T: ConfigValue>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        match self.lookup(path) {
            None => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| ConfigError::TypeMismatch {
                    path: path.to_string(),
                    expected: T::TYPE_NAME,
                    got: value.type_name(),
                }),
        }
    }

    fn get_string(&self, path: &str) -> Result<Option<String>, ConfigError> {
        self.get_as(path)
    }

    fn get_int(&self, path: &str) -> Result<Option<i64>, ConfigError> {
        self.get_as(path)
    }

    fn get_float(&self, path: &str) -> Result<Option<f64>, ConfigError> {
        self.get_as(path)
    }

    fn get_bool(&self, path: &str) -> Result<Option<bool>, ConfigError> {
        self.get_as(path)
    }

    fn get_string_list(&self, path: &str) -> Result<Option<Vec<String>>, ConfigError> {
        self.get_as(path)
    }

    fn get_string_map(&self, path: &str) -> Result<Option<BTreeMap<String, String>>, ConfigError> {
        self.get_as(path)
    }

    /// All blocks of a block-list attribute (`scheduled_task = [{..}, {..}]`)
    fn get_blocks(&self, path: &str) -> Result<Vec<BlockView<'_>>, ConfigError> {
        let items = match self.lookup(path) {
            None => return Ok(Vec::new()),
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(ConfigError::TypeMismatch {
                    path: path.to_string(),
                    expected: "Block",
                    got: other.type_name(),
                });
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Map(attributes) => Ok(BlockView { attributes }),
                other => Err(ConfigError::TypeMismatch {
                    path: format!("{}.{}", path, i),
                    expected: "Block",
                    got: other.type_name(),
                }),
            })
            .collect()
    }

    /// The first block of a single-block attribute (`autoscaler = [{..}]`)
    fn get_block(&self, path: &str) -> Result<Option<BlockView<'_>>, ConfigError> {
        Ok(self.get_blocks(path)?.into_iter().next())
    }
}

fn lookup_in<'a>(map: &'a BTreeMap<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = map.get(head)?;
    let value = match rest {
        Some(rest) => value.lookup(rest)?,
        None => value,
    };
    if value.is_null() { None } else { Some(value) }
}

/// Borrowed view of one nested block
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    attributes: &'a BTreeMap<String, Value>,
}

impl<'a> BlockView<'a> {
    pub fn new(attributes: &'a BTreeMap<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &'a BTreeMap<String, Value> {
        self.attributes
    }
}

impl Attributes for BlockView<'_> {
    fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_in(self.attributes, path)
    }
}

/// The flat view of one resource instance for a single lifecycle call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    id: Option<String>,
    values: BTreeMap<String, Value>,
    prior: BTreeMap<String, Value>,
}

impl Configuration {
    /// Configuration for a create: no ID, no prior state
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self {
            id: None,
            values,
            prior: BTreeMap::new(),
        }
    }

    /// Configuration for a read or import: current values are the persisted state
    pub fn from_state(id: impl Into<String>, state: BTreeMap<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            values: state.clone(),
            prior: state,
        }
    }

    /// Configuration for an update: planned values diffed against prior state
    pub fn for_update(
        id: impl Into<String>,
        prior: BTreeMap<String, Value>,
        planned: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            values: planned,
            prior,
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the instance as gone; the host drops it from state
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Write a top-level attribute
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Value at `path` in the prior persisted state
    pub fn lookup_prior(&self, path: &str) -> Option<&Value> {
        lookup_in(&self.prior, path)
    }

    /// Whether the value at `path` differs from the prior persisted state
    ///
    /// Absent and `Null` compare equal.
    pub fn has_change(&self, path: &str) -> bool {
        self.lookup(path) != self.lookup_prior(path)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.values
    }

    pub fn prior(&self) -> &BTreeMap<String, Value> {
        &self.prior
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Promote current values to prior state, as the host does after a successful apply
    pub fn commit(&mut self) {
        self.prior = self.values.clone();
    }
}

impl Attributes for Configuration {
    fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_in(&self.values, path)
    }
}
