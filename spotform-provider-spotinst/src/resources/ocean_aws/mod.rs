//! spotinst_ocean_aws - A Kubernetes worker node pool managed by Ocean

pub mod autoscaler;
pub mod capacity;
pub mod general;
pub mod instance_types;
pub mod launch_specification;
pub mod strategy;

use spotform_core::{Facet, RegistryError, ResourceDefinition};

use super::update_policy;
use crate::payloads::Cluster;

pub const NAME: &str = "spotinst_ocean_aws";

pub const FACETS: &[Facet<Cluster>] = &[
    general::setup,
    capacity::setup,
    strategy::setup,
    instance_types::setup,
    launch_specification::setup,
    autoscaler::setup,
    update_policy::setup::<Cluster>,
];

pub fn definition() -> Result<ResourceDefinition<Cluster>, RegistryError> {
    ResourceDefinition::with_facets(NAME, FACETS)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use spotform_core::{Configuration, FieldError, MappingError, Nullable, Payload, Value};

    fn values(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn strings(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::string(*s)).collect())
    }

    fn cluster() -> BTreeMap<String, Value> {
        values(&[
            ("name", Value::string("prod")),
            ("controller_id", Value::string("prod-eks")),
            ("region", Value::string("us-west-2")),
            ("max_size", Value::Int(100)),
            ("image_id", Value::string("ami-eks")),
            ("security_groups", strings(&["sg-1"])),
            ("subnet_ids", strings(&["subnet-1", "subnet-2"])),
            ("iam_instance_profile", Value::string("arn:aws:iam::1:instance-profile/nodes")),
            ("whitelist", strings(&["m5.large"])),
            (
                "autoscaler",
                Value::block([
                    ("autoscale_is_enabled", Value::Bool(true)),
                    ("autoscale_cooldown", Value::Int(300)),
                    (
                        "autoscale_headroom",
                        Value::block([("num_of_units", Value::Int(2))]),
                    ),
                ]),
            ),
        ])
    }

    #[test]
    fn test_create_expands_autoscaler_block() {
        let definition = definition().unwrap();
        let mut config = cluster();
        definition.apply_defaults(&mut config);
        assert!(definition.validate(&config).is_ok());

        let payload = definition.on_create(&Configuration::new(config)).unwrap();
        assert_eq!(payload.controller_cluster_id.as_deref(), Some("prod-eks"));

        let scaler = payload.auto_scaler.value().unwrap();
        assert_eq!(scaler.is_enabled, Some(true));
        assert_eq!(scaler.cooldown, Some(300));
        assert_eq!(scaler.headroom.as_ref().unwrap().num_of_units, Some(2));
        assert_eq!(scaler.down, None);

        let strategy = payload.strategy().unwrap();
        assert_eq!(strategy.fallback_to_od, Some(true));
        assert!(strategy.grace_period.is_unset());

        let profile = payload.launch_spec().unwrap().iam_instance_profile.value().unwrap();
        assert!(profile.arn.is_some());
        assert_eq!(
            payload.instance_types().unwrap().whitelist,
            Nullable::Value(vec!["m5.large".to_string()])
        );
    }

    #[test]
    fn test_whitelist_and_blacklist_conflict() {
        let definition = definition().unwrap();
        let mut config = cluster();
        config.insert("blacklist".to_string(), strings(&["t2.micro"]));

        let err = definition.on_create(&Configuration::new(config)).unwrap_err();
        assert_eq!(err.field().as_str(), "whitelist");
        assert!(matches!(
            err,
            MappingError::Encode {
                source: FieldError::Invalid { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_read_round_trips_autoscaler() {
        let definition = definition().unwrap();
        let config = cluster();
        let payload = definition
            .on_create(&Configuration::new(config.clone()))
            .unwrap();

        let mut state = Configuration::from_state("o-1", BTreeMap::new());
        definition.on_read(&payload, &mut state).unwrap();
        assert_eq!(state.values()["autoscaler"], config["autoscaler"]);
        assert_eq!(state.values()["grace_period"], Value::Int(-1));
        assert_eq!(state.values()["blacklist"], Value::List(Vec::new()));
        assert_eq!(state.values()["spot_percentage"], Value::Null);
    }

    #[test]
    fn test_removed_autoscaler_is_sent_as_null() {
        let definition = definition().unwrap();
        let prior = cluster();
        let mut planned = prior.clone();
        planned.remove("autoscaler");

        let outcome = definition
            .on_update(&Configuration::for_update("o-1", prior, planned))
            .unwrap();
        assert!(outcome.should_update());

        let mut expected = Cluster::with_identity("o-1");
        expected.auto_scaler = Nullable::Null;
        assert_eq!(outcome.payload, expected);
    }

    #[test]
    fn test_grace_period_update_and_reset() {
        let definition = definition().unwrap();
        let mut prior = cluster();
        prior.insert("grace_period".to_string(), Value::Int(-1));
        let mut planned = prior.clone();
        planned.insert("grace_period".to_string(), Value::Int(600));

        let outcome = definition
            .on_update(&Configuration::for_update("o-1", prior.clone(), planned.clone()))
            .unwrap();
        assert_eq!(
            outcome.payload.strategy().unwrap().grace_period,
            Nullable::Value(600)
        );

        let outcome = definition
            .on_update(&Configuration::for_update("o-1", planned, prior))
            .unwrap();
        assert!(outcome.payload.strategy().unwrap().grace_period.is_null());
    }
}
