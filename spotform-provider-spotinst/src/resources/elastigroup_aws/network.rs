//! Zones and subnets the group launches into

use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Group;
use crate::payloads::elastigroup::AvailabilityZone;
use crate::utils::{join_zone, split_zone};

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "availability_zones",
            AttributeType::list_of(AttributeType::String),
        )
        .with_description("Zones as \"name\" or \"name:subnet-id\""),
        Scalar::new(
            |g: &Group| {
                let zones = g.compute()?.availability_zones.as_ref()?;
                Some(
                    zones
                        .iter()
                        .map(|z| join_zone(&z.name, z.subnet_id.as_deref()))
                        .collect(),
                )
            },
            |g: &mut Group, v: Option<Vec<String>>| {
                g.compute_mut().availability_zones = v.map(|zones| {
                    zones
                        .iter()
                        .map(|entry| {
                            let (name, subnet_id) = split_zone(entry);
                            AvailabilityZone { name, subnet_id }
                        })
                        .collect()
                });
            },
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("subnet_ids", AttributeType::list_of(AttributeType::String)),
        Scalar::new(
            |g: &Group| g.compute()?.subnet_ids.clone(),
            |g: &mut Group, v| g.compute_mut().subnet_ids = v,
        ),
    ))?;

    Ok(())
}
