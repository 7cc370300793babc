use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Group;

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("instance_types_ondemand", AttributeType::String).required(),
        Scalar::new(
            |g: &Group| g.instance_types()?.on_demand.clone(),
            |g: &mut Group, v| g.instance_types_mut().on_demand = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "instance_types_spot",
            AttributeType::list_of(AttributeType::String),
        )
        .required(),
        Scalar::new(
            |g: &Group| g.instance_types()?.spot.clone(),
            |g: &mut Group, v| g.instance_types_mut().spot = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "instance_types_preferred_spot",
            AttributeType::list_of(AttributeType::String),
        ),
        Scalar::new(
            |g: &Group| g.instance_types()?.preferred_spot.cloned_value(),
            |g: &mut Group, v| g.instance_types_mut().preferred_spot.set(v),
        )
        .clear_on_absence(),
    ))?;

    Ok(())
}
