use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, RegistryError, Scalar,
};

use crate::payloads::Group;
use crate::utils::{build_tags, parse_tags};

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    // Removing every tag sends an empty list.
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("tags", AttributeType::map_of(AttributeType::String)),
        Scalar::new(
            |g: &Group| g.launch_spec()?.tags.as_deref().map(parse_tags),
            |g: &mut Group, v| g.launch_spec_mut().tags = Some(build_tags(v.unwrap_or_default())),
        )
        .clear_on_absence(),
    ))
}
