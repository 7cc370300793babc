//! Error taxonomy of the mapping engine
//!
//! The engine reports exactly two kinds of runtime failure to its caller,
//! [`MappingError::Encode`] and [`MappingError::Decode`], both naming the
//! offending field. [`RegistryError`] is raised while composing a resource
//! definition and aborts provider initialization.

use thiserror::Error;

use crate::field::FieldName;

/// Setup-time error raised while registering fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Field '{field}' is registered twice on resource '{resource}'")]
    DuplicateField { resource: String, field: FieldName },

    #[error("Invalid field name '{field}' on resource '{resource}': expected snake_case")]
    InvalidFieldName { resource: String, field: String },
}

/// Typed access to a configuration value failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Attribute '{path}': expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        got: &'static str,
    },
}

/// Failure raised by a single field's mapping strategy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{message}")]
    Invalid { message: String },
}

impl FieldError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Error returned by `on_create`, `on_read` and `on_update`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("Failed to expand field '{field}': {source}")]
    Encode {
        field: FieldName,
        #[source]
        source: FieldError,
    },

    #[error("Failed to flatten field '{field}': {source}")]
    Decode {
        field: FieldName,
        #[source]
        source: FieldError,
    },
}

impl MappingError {
    /// The field that failed
    pub fn field(&self) -> &FieldName {
        match self {
            MappingError::Encode { field, .. } | MappingError::Decode { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_error_names_field_and_cause() {
        let err = MappingError::Encode {
            field: FieldName::new("min_size"),
            source: ConfigError::TypeMismatch {
                path: "min_size".to_string(),
                expected: "Int",
                got: "String",
            }
            .into(),
        };

        assert_eq!(err.field().as_str(), "min_size");
        assert_eq!(
            err.to_string(),
            "Failed to expand field 'min_size': Attribute 'min_size': expected Int, got String"
        );
    }
}
