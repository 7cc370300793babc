use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Cluster;

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("name", AttributeType::String).optional_computed(),
        Scalar::new(|c: &Cluster| c.name.clone(), |c: &mut Cluster, v| c.name = v),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("controller_id", AttributeType::String)
            .required()
            .with_description("Identifier the in-cluster controller reports with"),
        Scalar::new(
            |c: &Cluster| c.controller_cluster_id.clone(),
            |c: &mut Cluster, v| c.controller_cluster_id = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("region", AttributeType::String).required(),
        Scalar::new(|c: &Cluster| c.region.clone(), |c: &mut Cluster, v| c.region = v),
    ))?;

    Ok(())
}
