//! Identity and placement of the group

use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Group;

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("name", AttributeType::String)
            .required()
            .with_description("The group name"),
        Scalar::new(|g: &Group| g.name.clone(), |g: &mut Group, v| g.name = v),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("description", AttributeType::String),
        Scalar::new(
            |g: &Group| g.description.cloned_value(),
            |g: &mut Group, v| g.description.set(v),
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("product", AttributeType::String)
            .required()
            .with_description("Operating system product, e.g. \"Linux/UNIX\""),
        Scalar::new(
            |g: &Group| g.compute()?.product.clone(),
            |g: &mut Group, v| g.compute_mut().product = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("region", AttributeType::String).required(),
        Scalar::new(|g: &Group| g.region.clone(), |g: &mut Group, v| g.region = v),
    ))?;

    Ok(())
}
