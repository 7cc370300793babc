//! Property-based tests using proptest
//!
//! These tests verify registry uniqueness, iteration order, and the
//! expand/flatten round-trip of scalar fields using randomized inputs.

use std::collections::BTreeMap;

use proptest::prelude::*;
use spotform_core::{
    AttributeSchema, AttributeType, Configuration, FieldDescriptor, FieldRegistry, Payload,
    RegistryError, ResourceDefinition, Scalar, SentinelInt, Value,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Group {
    id: Option<String>,
    label: Option<String>,
    size: Option<i64>,
    grace_period: Option<i64>,
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

fn field(name: &str) -> FieldDescriptor<Group> {
    FieldDescriptor::new(
        AttributeSchema::new(name, AttributeType::String),
        Scalar::new(|g: &Group| g.label.clone(), |g: &mut Group, v| g.label = v),
    )
}

fn definition() -> ResourceDefinition<Group> {
    let mut definition = ResourceDefinition::new("group");
    definition
        .register(FieldDescriptor::new(
            AttributeSchema::new("label", AttributeType::String),
            Scalar::new(|g: &Group| g.label.clone(), |g: &mut Group, v| g.label = v),
        ))
        .unwrap();
    definition
        .register(FieldDescriptor::new(
            AttributeSchema::new("size", AttributeType::Int),
            Scalar::new(|g: &Group| g.size, |g: &mut Group, v| g.size = v),
        ))
        .unwrap();
    definition
        .register(FieldDescriptor::new(
            AttributeSchema::new("grace_period", AttributeType::Int).with_default(-1),
            SentinelInt::new(
                -1,
                |g: &Group| g.grace_period,
                |g: &mut Group, v| g.grace_period = v,
            ),
        ))
        .unwrap();
    definition
}

/// Generate a sequence of field names that may contain repeats
fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e][a-z0-9_]{0,2}", 1..30)
}

proptest! {
    #[test]
    fn duplicate_registration_never_changes_registry(names in arb_names()) {
        let mut registry = FieldRegistry::new("group");
        let mut accepted: Vec<String> = Vec::new();

        for name in &names {
            let before = registry.len();
            match registry.register(field(name)) {
                Ok(()) => {
                    prop_assert!(!accepted.contains(name));
                    accepted.push(name.clone());
                }
                Err(RegistryError::DuplicateField { field, .. }) => {
                    prop_assert_eq!(field.as_str(), name.as_str());
                    prop_assert_eq!(registry.len(), before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        let order: Vec<String> = registry.names().map(|n| n.to_string()).collect();
        prop_assert_eq!(order, accepted);
    }

    #[test]
    fn iteration_order_is_stable(names in arb_names()) {
        let mut registry = FieldRegistry::new("group");
        for name in &names {
            let _ = registry.register(field(name));
        }

        let first: Vec<String> = registry.schema_map().iter().map(|(n, _)| n.to_string()).collect();
        let second: Vec<String> = registry.schema_map().iter().map(|(n, _)| n.to_string()).collect();
        prop_assert_eq!(&first, &second);
        let schema = registry.compose_schema();
        let composed: Vec<&str> = schema.names();
        let expected: Vec<&str> = first.iter().map(String::as_str).collect();
        prop_assert_eq!(composed, expected);
    }

    #[test]
    fn scalar_fields_round_trip(label in "[a-zA-Z0-9-]{1,20}", size in any::<i64>()) {
        let definition = definition();
        let values: BTreeMap<String, Value> = [
            ("label".to_string(), Value::string(label.clone())),
            ("size".to_string(), Value::Int(size)),
        ]
        .into();

        let payload = definition.on_create(&Configuration::new(values)).unwrap();
        let mut state = Configuration::from_state("sig-1", BTreeMap::new());
        definition.on_read(&payload, &mut state).unwrap();

        prop_assert_eq!(&state.values()["label"], &Value::string(label));
        prop_assert_eq!(&state.values()["size"], &Value::Int(size));
    }

    #[test]
    fn sentinel_is_consistent(grace in prop_oneof![Just(-1i64), 0i64..3600]) {
        let definition = definition();
        let values: BTreeMap<String, Value> =
            [("grace_period".to_string(), Value::Int(grace))].into();

        let payload = definition.on_create(&Configuration::new(values.clone())).unwrap();
        if grace == -1 {
            prop_assert_eq!(payload.grace_period, None);
        } else {
            prop_assert_eq!(payload.grace_period, Some(grace));
        }

        let mut state = Configuration::from_state("sig-1", BTreeMap::new());
        definition.on_read(&payload, &mut state).unwrap();
        prop_assert_eq!(&state.values()["grace_period"], &Value::Int(grace));

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", values.clone(), values))
            .unwrap();
        prop_assert!(!outcome.should_update());
    }

    #[test]
    fn update_touches_only_changed_fields(before in 0i64..100, after in 0i64..100) {
        let definition = definition();
        let prior: BTreeMap<String, Value> = [
            ("label".to_string(), Value::string("web")),
            ("size".to_string(), Value::Int(before)),
        ]
        .into();
        let mut planned = prior.clone();
        planned.insert("size".to_string(), Value::Int(after));

        let outcome = definition
            .on_update(&Configuration::for_update("sig-1", prior, planned))
            .unwrap();

        let mut expected = Group::with_identity("sig-1");
        if before != after {
            expected.size = Some(after);
        }
        prop_assert_eq!(outcome.should_update(), before != after);
        prop_assert_eq!(outcome.payload, expected);
    }
}
