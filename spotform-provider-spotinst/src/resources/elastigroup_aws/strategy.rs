//! Spot/on-demand mix and instance replacement behavior

use spotform_core::{
    AttributeSchema, AttributeType, ConflictsWith, FieldDescriptor, FieldRegistry, RegistryError,
    Scalar, Value,
};

use crate::payloads::Group;

pub const ORIENTATIONS: &[&str] = &[
    "balanced",
    "costOriented",
    "availabilityOriented",
    "equalAzDistribution",
];

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("spot_percentage", AttributeType::Float)
            .with_description("Percentage of spot instances; conflicts with ondemand_count"),
        ConflictsWith::new(
            "ondemand_count",
            Scalar::new(
                |g: &Group| g.strategy.as_ref()?.risk.cloned_value(),
                |g: &mut Group, v| g.strategy_mut().risk.set(v),
            )
            .with_empty(Value::Null)
            .clear_on_absence(),
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("ondemand_count", AttributeType::Int),
        ConflictsWith::new(
            "spot_percentage",
            Scalar::new(
                |g: &Group| g.strategy.as_ref()?.on_demand_count.cloned_value(),
                |g: &mut Group, v| g.strategy_mut().on_demand_count.set(v),
            )
            .with_empty(Value::Null)
            .clear_on_absence(),
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("orientation", AttributeType::enumeration(ORIENTATIONS))
            .required(),
        Scalar::new(
            |g: &Group| g.strategy.as_ref()?.availability_vs_cost.clone(),
            |g: &mut Group, v| g.strategy_mut().availability_vs_cost = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("draining_timeout", AttributeType::Int).optional_computed(),
        Scalar::new(
            |g: &Group| g.strategy.as_ref()?.draining_timeout,
            |g: &mut Group, v| g.strategy_mut().draining_timeout = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("fallback_to_ondemand", AttributeType::Bool).required(),
        Scalar::new(
            |g: &Group| g.strategy.as_ref()?.fallback_to_od,
            |g: &mut Group, v| g.strategy_mut().fallback_to_od = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("utilize_reserved_instances", AttributeType::Bool),
        Scalar::new(
            |g: &Group| g.strategy.as_ref()?.utilize_reserved_instances,
            |g: &mut Group, v| g.strategy_mut().utilize_reserved_instances = v,
        ),
    ))?;

    Ok(())
}
