//! Resource definition - One resource type's registry and its lifecycle passes
//!
//! A `ResourceDefinition` is composed once at provider startup from facet
//! setup functions and is read-only afterwards, so a single instance can be
//! shared by every concurrent lifecycle call for that resource type.
//!
//! The three passes:
//!
//! - [`ResourceDefinition::on_create`]: configuration -> full payload
//! - [`ResourceDefinition::on_read`]: payload -> configuration, every field written
//! - [`ResourceDefinition::on_update`]: configuration -> sparse payload of changed fields
//!
//! All passes run in registration order and stop at the first failing field.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::{debug, info};

use crate::config::Configuration;
use crate::differ::{ChangeTracker, UpdateOutcome};
use crate::error::{MappingError, RegistryError};
use crate::field::{FieldDescriptor, FieldScope};
use crate::payload::Payload;
use crate::registry::FieldRegistry;
use crate::schema::{ResourceSchema, TypeError};
use crate::value::Value;

/// A facet's setup function: registers its fields on a resource registry
pub type Facet<P> = fn(&mut FieldRegistry<P>) -> Result<(), RegistryError>;

/// Registry plus cached composed schema of one resource type
pub struct ResourceDefinition<P> {
    registry: FieldRegistry<P>,
    schema: OnceLock<ResourceSchema>,
}

impl<P: Payload> ResourceDefinition<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            registry: FieldRegistry::new(name),
            schema: OnceLock::new(),
        }
    }

    /// Compose a resource from facets, applied in the given order
    pub fn with_facets(name: impl Into<String>, facets: &[Facet<P>]) -> Result<Self, RegistryError> {
        let mut definition = Self::new(name);
        for setup in facets {
            setup(&mut definition.registry)?;
        }
        info!(
            "composed resource '{}' with {} fields",
            definition.name(),
            definition.registry.len()
        );
        Ok(definition)
    }

    pub fn register(&mut self, descriptor: FieldDescriptor<P>) -> Result<(), RegistryError> {
        self.registry.register(descriptor)?;
        self.schema = OnceLock::new();
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.registry.resource()
    }

    pub fn registry(&self) -> &FieldRegistry<P> {
        &self.registry
    }

    /// The composed schema handed to the host
    pub fn schema(&self) -> &ResourceSchema {
        self.schema.get_or_init(|| self.registry.compose_schema())
    }

    /// Validate a configuration against the composed schema
    pub fn validate(&self, values: &BTreeMap<String, Value>) -> Result<(), Vec<TypeError>> {
        self.schema().validate(values)
    }

    /// Fill declared defaults into absent attributes
    pub fn apply_defaults(&self, values: &mut BTreeMap<String, Value>) {
        self.schema().apply_defaults(values);
    }

    /// Expand a configuration into a full create payload
    pub fn on_create(&self, config: &Configuration) -> Result<P, MappingError> {
        let mut payload = P::default();
        for field in self.registry.iter() {
            debug!("{}: expanding '{}'", self.name(), field.name());
            field
                .encode(config, &mut payload)
                .map_err(|source| MappingError::Encode {
                    field: field.name().clone(),
                    source,
                })?;
        }
        Ok(payload)
    }

    /// Flatten a payload into configuration
    ///
    /// Every registered field writes its value, or its empty representation
    /// when the payload has no data for it, so no stale state survives.
    pub fn on_read(&self, payload: &P, config: &mut Configuration) -> Result<(), MappingError> {
        for field in self.registry.iter() {
            debug!("{}: flattening '{}'", self.name(), field.name());
            field
                .decode(payload, config)
                .map_err(|source| MappingError::Decode {
                    field: field.name().clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Build a sparse update payload from the fields that changed
    ///
    /// The payload starts out holding only the instance ID; unchanged fields
    /// stay unset so the API leaves their remote values alone.
    pub fn on_update(&self, config: &Configuration) -> Result<UpdateOutcome<P>, MappingError> {
        let mut payload = match config.id() {
            Some(id) => P::with_identity(id),
            None => P::default(),
        };
        let mut changes = ChangeTracker::new();

        for field in self.registry.iter() {
            if !field.has_changed(config, &payload) {
                continue;
            }
            debug!("{}: '{}' changed", self.name(), field.name());
            changes.record(field.name(), field.scope());

            if field.scope() == FieldScope::Remote {
                field
                    .encode_update(config, &mut payload)
                    .map_err(|source| MappingError::Encode {
                        field: field.name().clone(),
                        source,
                    })?;
            }
        }

        Ok(UpdateOutcome { payload, changes })
    }
}

impl<P> std::fmt::Debug for ResourceDefinition<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Attributes;
    use crate::error::FieldError;
    use crate::field::{FieldMapping, FieldName};
    use crate::mapping::{Scalar, SentinelInt};
    use crate::payload::{Nullable, ensure};
    use crate::schema::{AttributeSchema, AttributeType};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct LaunchSpec {
        health_check_type: Nullable<String>,
        grace_period: Nullable<i64>,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Group {
        id: Option<String>,
        name: Option<String>,
        launch_spec: Option<LaunchSpec>,
    }

    impl Group {
        fn launch_spec_mut(&mut self) -> &mut LaunchSpec {
            ensure(&mut self.launch_spec)
        }
    }

    impl Payload for Group {
        fn identity(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn with_identity(id: &str) -> Self {
            Self {
                id: Some(id.to_string()),
                ..Default::default()
            }
        }
    }

    fn general(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
        registry.register(FieldDescriptor::new(
            AttributeSchema::new("name", AttributeType::String).required(),
            Scalar::new(|g: &Group| g.name.clone(), |g: &mut Group, v| g.name = v),
        ))
    }

    fn health_check(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
        registry.register(FieldDescriptor::new(
            AttributeSchema::new("grace_period", AttributeType::Int).with_default(-1),
            SentinelInt::new(
                -1,
                |g: &Group| g.launch_spec.as_ref()?.grace_period.cloned_value(),
                |g: &mut Group, v| g.launch_spec_mut().grace_period.set(v),
            ),
        ))?;
        registry.register(FieldDescriptor::new(
            AttributeSchema::new("health_check_type", AttributeType::String),
            Scalar::new(
                |g: &Group| g.launch_spec.as_ref()?.health_check_type.cloned_value(),
                |g: &mut Group, v| g.launch_spec_mut().health_check_type.set(v),
            )
            .clear_on_absence(),
        ))
    }

    fn update_policy(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
        registry.register(FieldDescriptor::local(AttributeSchema::new(
            "update_policy",
            AttributeType::single_block(vec![AttributeSchema::new(
                "should_roll",
                AttributeType::Bool,
            )]),
        )))
    }

    fn definition() -> ResourceDefinition<Group> {
        ResourceDefinition::with_facets("group", &[general, health_check, update_policy]).unwrap()
    }

    fn values(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn duplicate_facet_fails_composition() {
        let err = ResourceDefinition::<Group>::with_facets("group", &[general, general]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateField { .. }));
    }

    #[test]
    fn schema_is_composed_in_registration_order() {
        let definition = definition();
        assert_eq!(
            definition.schema().names(),
            vec!["name", "grace_period", "health_check_type", "update_policy"]
        );
        assert_eq!(definition.schema().names(), definition.schema().names());
    }

    #[test]
    fn create_then_read_clears_dropped_field() {
        let definition = definition();
        let config = Configuration::new(values(&[
            ("name", Value::string("web")),
            ("grace_period", Value::Int(120)),
            ("health_check_type", Value::string("EC2")),
        ]));

        let payload = definition.on_create(&config).unwrap();
        let spec = payload.launch_spec.clone().unwrap();
        assert_eq!(spec.grace_period, Nullable::Value(120));
        assert_eq!(spec.health_check_type, Nullable::Value("EC2".to_string()));

        let mut remote = payload;
        remote.launch_spec.as_mut().unwrap().health_check_type = Nullable::Unset;

        let mut state = Configuration::from_state("sig-1", config.values().clone());
        definition.on_read(&remote, &mut state).unwrap();
        assert_eq!(state.values()["grace_period"], Value::Int(120));
        assert_eq!(state.values()["health_check_type"], Value::string(""));
        assert_eq!(state.values()["name"], Value::string("web"));
    }

    #[test]
    fn read_of_empty_payload_writes_every_field() {
        let definition = definition();
        let mut state = Configuration::from_state(
            "sig-1",
            values(&[
                ("name", Value::string("web")),
                ("grace_period", Value::Int(300)),
            ]),
        );

        definition.on_read(&Group::default(), &mut state).unwrap();
        assert_eq!(state.values()["name"], Value::string(""));
        assert_eq!(state.values()["grace_period"], Value::Int(-1));
        assert_eq!(state.values()["health_check_type"], Value::string(""));
        assert!(state.values()["update_policy"].is_null());
    }

    #[test]
    fn create_fails_on_first_bad_field() {
        let definition = definition();
        let config = Configuration::new(values(&[
            ("name", Value::Int(1)),
            ("grace_period", Value::string("soon")),
        ]));

        let err = definition.on_create(&config).unwrap_err();
        assert_eq!(err.field().as_str(), "name");
        assert!(matches!(err, MappingError::Encode { .. }));
    }

    #[test]
    fn update_payload_is_sparse() {
        let definition = definition();
        let prior = values(&[
            ("name", Value::string("web")),
            ("grace_period", Value::Int(-1)),
            ("health_check_type", Value::string("EC2")),
        ]);
        let mut planned = prior.clone();
        planned.insert("name".to_string(), Value::string("api"));

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", prior, planned))
            .unwrap();

        assert!(outcome.should_update());
        assert_eq!(
            outcome.payload,
            Group {
                id: Some("sig-1".to_string()),
                name: Some("api".to_string()),
                launch_spec: None,
            }
        );
        assert_eq!(outcome.changes.changed_fields(), &[FieldName::new("name")]);
    }

    #[test]
    fn update_without_changes_does_not_call_api() {
        let definition = definition();
        let prior = values(&[("name", Value::string("web"))]);
        let mut planned = prior.clone();
        planned.insert("grace_period".to_string(), Value::Int(-1));

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", prior, planned))
            .unwrap();
        assert!(!outcome.should_update());
        assert_eq!(outcome.payload, Group::with_identity("sig-1"));
    }

    #[test]
    fn local_field_change_is_tracked_without_update() {
        let definition = definition();
        let prior = values(&[("name", Value::string("web"))]);
        let mut planned = prior.clone();
        planned.insert(
            "update_policy".to_string(),
            Value::block([("should_roll", Value::Bool(true))]),
        );

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", prior, planned))
            .unwrap();
        assert!(!outcome.should_update());
        assert!(outcome.changes.is_changed("update_policy"));
        assert_eq!(outcome.payload, Group::with_identity("sig-1"));
    }

    #[test]
    fn removed_health_check_is_cleared_on_update() {
        let definition = definition();
        let prior = values(&[
            ("name", Value::string("web")),
            ("health_check_type", Value::string("ELB")),
        ]);
        let planned = values(&[("name", Value::string("web"))]);

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", prior, planned))
            .unwrap();
        assert!(outcome.should_update());
        let spec = outcome.payload.launch_spec.unwrap();
        assert!(spec.health_check_type.is_null());
        assert!(spec.grace_period.is_unset());
    }

    struct Failing;

    impl FieldMapping<Group> for Failing {
        fn encode(&self, _: &FieldName, _: &Configuration, _: &mut Group) -> Result<(), FieldError> {
            Ok(())
        }

        fn decode(&self, _: &FieldName, _: &Group, _: &mut Configuration) -> Result<(), FieldError> {
            Err(FieldError::invalid("unexpected payload shape"))
        }
    }

    #[test]
    fn read_reports_decode_error_with_field() {
        let mut definition = definition();
        definition
            .register(FieldDescriptor::new(
                AttributeSchema::new("broken", AttributeType::String),
                Failing,
            ))
            .unwrap();
        assert!(definition.schema().get("broken").is_some());

        let mut state = Configuration::from_state("sig-1", BTreeMap::new());
        let err = definition.on_read(&Group::default(), &mut state).unwrap_err();
        assert!(matches!(err, MappingError::Decode { ref field, .. } if field.as_str() == "broken"));
        assert_eq!(state.get_string("name").unwrap(), Some(String::new()));
    }

    #[test]
    fn validate_and_defaults() {
        let definition = definition();
        let mut config = values(&[("name", Value::string("web"))]);
        definition.apply_defaults(&mut config);
        assert_eq!(config["grace_period"], Value::Int(-1));
        assert!(definition.validate(&config).is_ok());

        assert!(definition.validate(&BTreeMap::new()).is_err());
    }

    #[test]
    fn definition_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ResourceDefinition<Group>>();
    }
}
