//! Schema - Schema fragments owned by individual fields
//!
//! Every registered field carries one [`AttributeSchema`]. The resource
//! definition composes them, in registration order, into the
//! [`ResourceSchema`] exposed to the host framework.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::Value;

/// Attribute type
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Int,
    Float,
    Bool,
    /// String restricted to a list of allowed values
    Enum(Vec<String>),
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Nested block, represented as a list of attribute maps
    Block {
        attributes: Vec<AttributeSchema>,
        max_items: Option<usize>,
    },
}

impl AttributeType {
    pub fn enumeration(variants: &[&str]) -> Self {
        AttributeType::Enum(variants.iter().map(|v| v.to_string()).collect())
    }

    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    pub fn map_of(inner: AttributeType) -> Self {
        AttributeType::Map(Box::new(inner))
    }

    /// A block that may appear at most once
    pub fn single_block(attributes: Vec<AttributeSchema>) -> Self {
        AttributeType::Block {
            attributes,
            max_items: Some(1),
        }
    }

    pub fn block_list(attributes: Vec<AttributeSchema>) -> Self {
        AttributeType::Block {
            attributes,
            max_items: None,
        }
    }

    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (_, Value::Null) => Ok(()),
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Float, Value::Float(_) | Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (
                AttributeType::Block {
                    attributes,
                    max_items,
                },
                Value::List(items),
            ) => {
                if let Some(max) = max_items
                    && items.len() > *max
                {
                    return Err(TypeError::TooManyBlocks {
                        max: *max,
                        got: items.len(),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    let Value::Map(block) = item else {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(TypeError::TypeMismatch {
                                expected: "Block".to_string(),
                                got: item.type_name().to_string(),
                            }),
                        });
                    };
                    validate_attributes(attributes, block).map_err(|errors| {
                        TypeError::BlockError {
                            index: i,
                            errors,
                        }
                    })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Float => "Float".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block { max_items, .. } => match max_items {
                Some(1) => "Block".to_string(),
                _ => "List<Block>".to_string(),
            },
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be configured")]
    ComputedAttribute { name: String },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },

    #[error("Too many blocks: at most {max} allowed, got {got}")]
    TooManyBlocks { max: usize, got: usize },

    #[error("Block at index {index}: {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    BlockError { index: usize, errors: Vec<TypeError> },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },
}

/// How the host treats an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeMode {
    Required,
    #[default]
    Optional,
    /// Set by the provider only
    Computed,
    /// Configurable; filled in by the provider when omitted
    OptionalComputed,
}

/// Attribute schema
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub mode: AttributeMode,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Redacted in host output
    pub sensitive: bool,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            mode: AttributeMode::Optional,
            default: None,
            description: None,
            sensitive: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.mode = AttributeMode::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.mode = AttributeMode::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.mode = AttributeMode::OptionalComputed;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.mode == AttributeMode::Required
    }
}

fn validate_attributes(
    schemas: &[AttributeSchema],
    values: &BTreeMap<String, Value>,
) -> Result<(), Vec<TypeError>> {
    let mut errors = Vec::new();

    for schema in schemas {
        match values.get(&schema.name) {
            None | Some(Value::Null) => {
                if schema.is_required() && schema.default.is_none() {
                    errors.push(TypeError::MissingRequired {
                        name: schema.name.clone(),
                    });
                }
            }
            Some(value) => {
                if let Err(e) = schema.attr_type.validate(value) {
                    errors.push(TypeError::AttributeError {
                        name: schema.name.clone(),
                        inner: Box::new(e),
                    });
                }
            }
        }
    }

    for name in values.keys() {
        if !schemas.iter().any(|s| &s.name == name) {
            errors.push(TypeError::UnknownAttribute { name: name.clone() });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Composed schema of one resource type, in field registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    pub resource_type: String,
    attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.push(schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.attributes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Validate configured attributes
    ///
    /// Computed attributes may appear in state but not in configuration.
    pub fn validate(&self, values: &BTreeMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = match validate_attributes(&self.attributes, values) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        for schema in &self.attributes {
            if schema.mode == AttributeMode::Computed
                && values.get(&schema.name).is_some_and(|v| !v.is_null())
            {
                errors.push(TypeError::ComputedAttribute {
                    name: schema.name.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill absent attributes that declare a default, inside blocks too
    pub fn apply_defaults(&self, values: &mut BTreeMap<String, Value>) {
        apply_defaults_to(&self.attributes, values);
    }
}

fn apply_defaults_to(schemas: &[AttributeSchema], values: &mut BTreeMap<String, Value>) {
    for schema in schemas {
        if let Some(default) = &schema.default {
            let absent = values.get(&schema.name).is_none_or(Value::is_null);
            if absent {
                values.insert(schema.name.clone(), default.clone());
            }
        }

        if let AttributeType::Block { attributes, .. } = &schema.attr_type
            && let Some(Value::List(blocks)) = values.get_mut(&schema.name)
        {
            for block in blocks {
                if let Value::Map(block) = block {
                    apply_defaults_to(attributes, block);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn validate_scalar_types() {
        assert!(AttributeType::String.validate(&Value::string("a")).is_ok());
        assert!(AttributeType::String.validate(&Value::Int(1)).is_err());
        assert!(AttributeType::Float.validate(&Value::Int(1)).is_ok());
        assert!(AttributeType::Int.validate(&Value::Float(1.5)).is_err());
        assert!(AttributeType::Bool.validate(&Value::Null).is_ok());
    }

    #[test]
    fn validate_enum_type() {
        let t = AttributeType::enumeration(&["EC2", "ELB"]);
        assert!(t.validate(&Value::string("EC2")).is_ok());
        assert!(matches!(
            t.validate(&Value::string("TCP")),
            Err(TypeError::InvalidEnumVariant { .. })
        ));
    }

    #[test]
    fn validate_list_items() {
        let t = AttributeType::list_of(AttributeType::String);
        assert_eq!(t.to_string(), "List<String>");
        assert!(t.validate(&Value::List(vec![Value::string("sg-1")])).is_ok());
        assert!(matches!(
            t.validate(&Value::List(vec![Value::string("sg-1"), Value::Int(2)])),
            Err(TypeError::ListItemError { index: 1, .. })
        ));
    }

    #[test]
    fn validate_single_block() {
        let t = AttributeType::single_block(vec![
            AttributeSchema::new("cooldown", AttributeType::Int),
            AttributeSchema::new("is_enabled", AttributeType::Bool).required(),
        ]);

        let ok = Value::block([("is_enabled", Value::Bool(true)), ("cooldown", Value::Int(60))]);
        assert!(t.validate(&ok).is_ok());

        let missing = Value::block([("cooldown", Value::Int(60))]);
        assert!(matches!(
            t.validate(&missing),
            Err(TypeError::BlockError { index: 0, .. })
        ));

        let too_many = Value::List(vec![
            Value::Map(attrs(&[("is_enabled", Value::Bool(true))])),
            Value::Map(attrs(&[("is_enabled", Value::Bool(false))])),
        ]);
        assert_eq!(
            t.validate(&too_many),
            Err(TypeError::TooManyBlocks { max: 1, got: 2 })
        );
    }

    #[test]
    fn validate_resource_schema() {
        let schema = ResourceSchema::new("group")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(AttributeSchema::new("min_size", AttributeType::Int))
            .attribute(AttributeSchema::new("status", AttributeType::String).computed());

        assert!(
            schema
                .validate(&attrs(&[
                    ("name", Value::string("web")),
                    ("min_size", Value::Int(1)),
                ]))
                .is_ok()
        );

        let errors = schema
            .validate(&attrs(&[
                ("min_size", Value::string("one")),
                ("status", Value::string("ACTIVE")),
                ("bogus", Value::Int(1)),
            ]))
            .unwrap_err();
        assert!(errors.contains(&TypeError::MissingRequired {
            name: "name".to_string()
        }));
        assert!(errors.contains(&TypeError::UnknownAttribute {
            name: "bogus".to_string()
        }));
        assert!(errors.contains(&TypeError::ComputedAttribute {
            name: "status".to_string()
        }));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::AttributeError { name, .. } if name == "min_size"))
        );
    }

    #[test]
    fn apply_defaults_fills_only_absent() {
        let schema = ResourceSchema::new("group")
            .attribute(AttributeSchema::new("grace_period", AttributeType::Int).with_default(-1))
            .attribute(AttributeSchema::new("product", AttributeType::String).with_default("Linux/UNIX"));

        let mut values = attrs(&[("grace_period", Value::Int(120)), ("product", Value::Null)]);
        schema.apply_defaults(&mut values);

        assert_eq!(values["grace_period"], Value::Int(120));
        assert_eq!(values["product"], Value::string("Linux/UNIX"));
    }

    #[test]
    fn apply_defaults_descends_into_blocks() {
        let schema = ResourceSchema::new("group").attribute(AttributeSchema::new(
            "scheduled_task",
            AttributeType::block_list(vec![
                AttributeSchema::new("cron_expression", AttributeType::String),
                AttributeSchema::new("is_enabled", AttributeType::Bool).with_default(true),
            ]),
        ));

        let mut values = attrs(&[(
            "scheduled_task",
            Value::List(vec![
                Value::Map(attrs(&[("cron_expression", Value::string("0 1 * * *"))])),
                Value::Map(attrs(&[("is_enabled", Value::Bool(false))])),
            ]),
        )]);
        schema.apply_defaults(&mut values);

        assert_eq!(values["scheduled_task"].lookup("0.is_enabled"), Some(&Value::Bool(true)));
        assert_eq!(values["scheduled_task"].lookup("1.is_enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn schema_keeps_declaration_order() {
        let schema = ResourceSchema::new("group")
            .attribute(AttributeSchema::new("zeta", AttributeType::Int))
            .attribute(AttributeSchema::new("alpha", AttributeType::Int));
        assert_eq!(schema.names(), vec!["zeta", "alpha"]);
    }
}
