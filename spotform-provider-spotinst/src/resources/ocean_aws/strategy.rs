use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
    SentinelInt, Value,
};

use crate::payloads::Cluster;

/// `grace_period` value meaning "not configured"
pub const UNSET_GRACE_PERIOD: i64 = -1;

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("spot_percentage", AttributeType::Int),
        Scalar::new(
            |c: &Cluster| c.strategy()?.spot_percentage.cloned_value(),
            |c: &mut Cluster, v| c.strategy_mut().spot_percentage.set(v),
        )
        .with_empty(Value::Null)
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("fallback_to_ondemand", AttributeType::Bool).with_default(true),
        Scalar::new(
            |c: &Cluster| c.strategy()?.fallback_to_od,
            |c: &mut Cluster, v| c.strategy_mut().fallback_to_od = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("utilize_reserved_instances", AttributeType::Bool).with_default(true),
        Scalar::new(
            |c: &Cluster| c.strategy()?.utilize_reserved_instances,
            |c: &mut Cluster, v| c.strategy_mut().utilize_reserved_instances = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("draining_timeout", AttributeType::Int),
        Scalar::new(
            |c: &Cluster| c.strategy()?.draining_timeout.cloned_value(),
            |c: &mut Cluster, v| c.strategy_mut().draining_timeout.set(v),
        )
        .with_empty(Value::Null)
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("grace_period", AttributeType::Int)
            .with_default(UNSET_GRACE_PERIOD)
            .with_description("Seconds before a new instance is health checked; -1 for the API default"),
        SentinelInt::new(
            UNSET_GRACE_PERIOD,
            |c: &Cluster| c.strategy()?.grace_period.cloned_value(),
            |c: &mut Cluster, v| c.strategy_mut().grace_period.set(v),
        ),
    ))?;

    Ok(())
}
