//! Launch specification of the group's instances

use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
    SentinelInt,
};

use crate::payloads::Group;

pub const HEALTH_CHECK_TYPES: &[&str] = &["EC2", "ELB", "TARGET_GROUP", "HCS", "MLB", "NONE"];

/// `health_check_grace_period` value meaning "not configured"
pub const UNSET_GRACE_PERIOD: i64 = -1;

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("image_id", AttributeType::String).required(),
        Scalar::new(
            |g: &Group| g.launch_spec()?.image_id.clone(),
            |g: &mut Group, v| g.launch_spec_mut().image_id = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "security_groups",
            AttributeType::list_of(AttributeType::String),
        )
        .required(),
        Scalar::new(
            |g: &Group| g.launch_spec()?.security_group_ids.clone(),
            |g: &mut Group, v| g.launch_spec_mut().security_group_ids = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("key_name", AttributeType::String),
        Scalar::new(
            |g: &Group| g.launch_spec()?.key_pair.cloned_value(),
            |g: &mut Group, v| g.launch_spec_mut().key_pair.set(v),
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("user_data", AttributeType::String).sensitive(),
        Scalar::new(
            |g: &Group| g.launch_spec()?.user_data.cloned_value(),
            |g: &mut Group, v| g.launch_spec_mut().user_data.set(v),
        )
        .clear_on_absence(),
    ))?;

    // String rather than Enum: a cleared value flattens to "".
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("health_check_type", AttributeType::String).with_description(
            format!("One of {}", HEALTH_CHECK_TYPES.join(", ")),
        ),
        Scalar::new(
            |g: &Group| g.launch_spec()?.health_check_type.cloned_value(),
            |g: &mut Group, v| g.launch_spec_mut().health_check_type.set(v),
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("health_check_grace_period", AttributeType::Int)
            .with_default(UNSET_GRACE_PERIOD),
        SentinelInt::new(
            UNSET_GRACE_PERIOD,
            |g: &Group| g.launch_spec()?.health_check_grace_period.cloned_value(),
            |g: &mut Group, v| g.launch_spec_mut().health_check_grace_period.set(v),
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("enable_monitoring", AttributeType::Bool),
        Scalar::new(
            |g: &Group| g.launch_spec()?.monitoring,
            |g: &mut Group, v| g.launch_spec_mut().monitoring = v,
        ),
    ))?;

    Ok(())
}
