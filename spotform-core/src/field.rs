//! Field - One named unit of expand/flatten logic
//!
//! A [`FieldDescriptor`] pairs the schema fragment of one attribute with the
//! [`FieldMapping`] strategy that moves it between configuration and payload.
//! Descriptors are built once while composing a resource definition and are
//! shared read-only afterwards.

use std::borrow::Borrow;
use std::fmt;

use crate::config::Configuration;
use crate::error::FieldError;
use crate::schema::AttributeSchema;

/// Unique key of a configurable attribute within one resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Expand/flatten/diff strategy for one field of payload type `P`
pub trait FieldMapping<P>: Send + Sync {
    /// Read the field from configuration and apply it to the payload
    ///
    /// Absent values leave the payload untouched.
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError>;

    /// Write the field into configuration from the payload
    ///
    /// Must always write, using the field's empty representation when the
    /// payload has no data, so a remotely removed attribute clears state.
    fn decode(
        &self,
        field: &FieldName,
        payload: &P,
        config: &mut Configuration,
    ) -> Result<(), FieldError>;

    /// Whether this field must be part of the update payload
    fn has_changed(&self, field: &FieldName, config: &Configuration, _payload: &P) -> bool {
        config.has_change(field.as_str())
    }

    /// Encoding used on update for a field flagged as changed
    ///
    /// Defaults to [`FieldMapping::encode`]; strategies that must send an
    /// explicit reset when the value was removed override this.
    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        self.encode(field, config, payload)
    }
}

/// Where a field's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldScope {
    /// Sent to the vendor API
    #[default]
    Remote,
    /// Provider-side only (e.g. how to roll after an update); tracked in
    /// state and diffed, but never part of the payload
    Local,
}

/// A registered field: name, schema fragment and mapping strategy
pub struct FieldDescriptor<P> {
    name: FieldName,
    schema: AttributeSchema,
    mapping: Box<dyn FieldMapping<P>>,
    scope: FieldScope,
}

impl<P> FieldDescriptor<P> {
    /// The field name is the schema fragment's name
    pub fn new(schema: AttributeSchema, mapping: impl FieldMapping<P> + 'static) -> Self {
        Self {
            name: FieldName::new(schema.name.clone()),
            schema,
            mapping: Box::new(mapping),
            scope: FieldScope::Remote,
        }
    }

    /// A provider-side field that never reaches the payload
    pub fn local(schema: AttributeSchema) -> Self
    where
        P: 'static,
    {
        Self {
            scope: FieldScope::Local,
            ..Self::new(schema, crate::mapping::LocalOnly)
        }
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn scope(&self) -> FieldScope {
        self.scope
    }

    pub fn mapping(&self) -> &dyn FieldMapping<P> {
        self.mapping.as_ref()
    }

    pub fn encode(&self, config: &Configuration, payload: &mut P) -> Result<(), FieldError> {
        self.mapping.encode(&self.name, config, payload)
    }

    pub fn decode(&self, payload: &P, config: &mut Configuration) -> Result<(), FieldError> {
        self.mapping.decode(&self.name, payload, config)
    }

    pub fn has_changed(&self, config: &Configuration, payload: &P) -> bool {
        self.mapping.has_changed(&self.name, config, payload)
    }

    pub fn encode_update(&self, config: &Configuration, payload: &mut P) -> Result<(), FieldError> {
        self.mapping.encode_update(&self.name, config, payload)
    }
}

impl<P> fmt::Debug for FieldDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
