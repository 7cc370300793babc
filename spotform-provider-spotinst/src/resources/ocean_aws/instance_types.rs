//! Instance type allow and deny lists; at most one may be set

use spotform_core::{
    AttributeSchema, AttributeType, ConflictsWith, FieldDescriptor, FieldRegistry, RegistryError,
    Scalar,
};

use crate::payloads::Cluster;

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("whitelist", AttributeType::list_of(AttributeType::String)),
        ConflictsWith::new(
            "blacklist",
            Scalar::new(
                |c: &Cluster| c.instance_types()?.whitelist.cloned_value(),
                |c: &mut Cluster, v| c.instance_types_mut().whitelist.set(v),
            )
            .clear_on_absence(),
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("blacklist", AttributeType::list_of(AttributeType::String)),
        ConflictsWith::new(
            "whitelist",
            Scalar::new(
                |c: &Cluster| c.instance_types()?.blacklist.cloned_value(),
                |c: &mut Cluster, v| c.instance_types_mut().blacklist.set(v),
            )
            .clear_on_absence(),
        ),
    ))?;

    Ok(())
}
