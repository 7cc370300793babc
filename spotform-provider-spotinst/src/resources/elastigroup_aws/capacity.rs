use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Group;

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("min_size", AttributeType::Int).optional_computed(),
        Scalar::new(
            |g: &Group| g.capacity.as_ref()?.minimum,
            |g: &mut Group, v| g.capacity_mut().minimum = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("max_size", AttributeType::Int).optional_computed(),
        Scalar::new(
            |g: &Group| g.capacity.as_ref()?.maximum,
            |g: &mut Group, v| g.capacity_mut().maximum = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("desired_capacity", AttributeType::Int).optional_computed(),
        Scalar::new(
            |g: &Group| g.capacity.as_ref()?.target,
            |g: &mut Group, v| g.capacity_mut().target = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "capacity_unit",
            AttributeType::enumeration(&["instance", "weight"]),
        )
        .optional_computed(),
        Scalar::new(
            |g: &Group| g.capacity.as_ref()?.unit.clone(),
            |g: &mut Group, v| g.capacity_mut().unit = v,
        ),
    ))?;

    Ok(())
}
