//! Field registry - Insertion-ordered map of field name to descriptor
//!
//! Registration order is also the order of every encode, decode and diff
//! pass, and the order of the composed schema.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RegistryError;
use crate::field::{FieldDescriptor, FieldName};
use crate::schema::{AttributeSchema, ResourceSchema};

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid field name pattern"));

/// Ordered collection of the fields of one resource type
pub struct FieldRegistry<P> {
    resource: String,
    fields: Vec<FieldDescriptor<P>>,
    index: HashMap<FieldName, usize>,
}

impl<P> FieldRegistry<P> {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Add a field
    ///
    /// Fails without modifying the registry if the name is taken or is not
    /// snake_case.
    pub fn register(&mut self, descriptor: FieldDescriptor<P>) -> Result<(), RegistryError> {
        let name = descriptor.name().clone();

        if !FIELD_NAME.is_match(name.as_str()) {
            return Err(RegistryError::InvalidFieldName {
                resource: self.resource.clone(),
                field: name.to_string(),
            });
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateField {
                resource: self.resource.clone(),
                field: name,
            });
        }

        self.index.insert(name, self.fields.len());
        self.fields.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<P>> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<P>> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().map(FieldDescriptor::name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Name to schema fragment for every field, in registration order
    pub fn schema_map(&self) -> Vec<(&FieldName, &AttributeSchema)> {
        self.fields.iter().map(|f| (f.name(), f.schema())).collect()
    }

    /// Compose the resource schema
    pub fn compose_schema(&self) -> ResourceSchema {
        self.fields
            .iter()
            .fold(ResourceSchema::new(&self.resource), |schema, field| {
                schema.attribute(field.schema().clone())
            })
    }
}

impl<P> std::fmt::Debug for FieldRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("resource", &self.resource)
            .field("fields", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
