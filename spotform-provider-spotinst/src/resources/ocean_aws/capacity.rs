use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Cluster;

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("min_size", AttributeType::Int).optional_computed(),
        Scalar::new(
            |c: &Cluster| c.capacity.as_ref()?.minimum,
            |c: &mut Cluster, v| c.capacity_mut().minimum = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("max_size", AttributeType::Int).optional_computed(),
        Scalar::new(
            |c: &Cluster| c.capacity.as_ref()?.maximum,
            |c: &mut Cluster, v| c.capacity_mut().maximum = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("desired_capacity", AttributeType::Int).optional_computed(),
        Scalar::new(
            |c: &Cluster| c.capacity.as_ref()?.target,
            |c: &mut Cluster, v| c.capacity_mut().target = v,
        ),
    ))?;

    Ok(())
}
