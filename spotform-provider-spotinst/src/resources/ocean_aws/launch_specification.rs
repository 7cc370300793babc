//! Default launch specification of the cluster's nodes

use spotform_core::{
    AttributeSchema, AttributeType, FieldDescriptor, FieldRegistry, Nullable, RegistryError,
    Scalar,
};

use crate::payloads::Cluster;
use crate::payloads::ocean::IamInstanceProfile;
use crate::utils::{build_tags, parse_tags};

/// An instance profile given as an ARN rather than a name
fn instance_profile(reference: String) -> IamInstanceProfile {
    if reference.starts_with("arn:") {
        IamInstanceProfile {
            arn: Some(reference),
            name: None,
        }
    } else {
        IamInstanceProfile {
            arn: None,
            name: Some(reference),
        }
    }
}

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new("image_id", AttributeType::String).required(),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.image_id.clone(),
            |c: &mut Cluster, v| c.launch_spec_mut().image_id = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "security_groups",
            AttributeType::list_of(AttributeType::String),
        )
        .required(),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.security_group_ids.clone(),
            |c: &mut Cluster, v| c.launch_spec_mut().security_group_ids = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("subnet_ids", AttributeType::list_of(AttributeType::String))
            .required(),
        Scalar::new(
            |c: &Cluster| c.compute()?.subnet_ids.clone(),
            |c: &mut Cluster, v| c.compute_mut().subnet_ids = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("user_data", AttributeType::String).sensitive(),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.user_data.cloned_value(),
            |c: &mut Cluster, v| c.launch_spec_mut().user_data.set(v),
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("key_name", AttributeType::String),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.key_pair.cloned_value(),
            |c: &mut Cluster, v| c.launch_spec_mut().key_pair.set(v),
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("iam_instance_profile", AttributeType::String)
            .with_description("Instance profile name or ARN"),
        Scalar::new(
            |c: &Cluster| {
                let profile = c.launch_spec()?.iam_instance_profile.value()?;
                profile.arn.clone().or_else(|| profile.name.clone())
            },
            |c: &mut Cluster, v: Option<String>| {
                c.launch_spec_mut().iam_instance_profile = match v {
                    Some(reference) => Nullable::Value(instance_profile(reference)),
                    None => Nullable::Null,
                };
            },
        )
        .clear_on_absence(),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("associate_public_ip_address", AttributeType::Bool),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.associate_public_ip_address,
            |c: &mut Cluster, v| c.launch_spec_mut().associate_public_ip_address = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("monitoring", AttributeType::Bool),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.monitoring,
            |c: &mut Cluster, v| c.launch_spec_mut().monitoring = v,
        ),
    ))?;

    registry.register(FieldDescriptor::new(
        AttributeSchema::new("tags", AttributeType::map_of(AttributeType::String)),
        Scalar::new(
            |c: &Cluster| c.launch_spec()?.tags.as_deref().map(parse_tags),
            |c: &mut Cluster, v| {
                c.launch_spec_mut().tags = Some(build_tags(v.unwrap_or_default()))
            },
        )
        .clear_on_absence(),
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_profile_reference() {
        let by_arn = instance_profile("arn:aws:iam::123:instance-profile/nodes".to_string());
        assert!(by_arn.arn.is_some());
        assert_eq!(by_arn.name, None);

        let by_name = instance_profile("nodes".to_string());
        assert_eq!(by_name.name.as_deref(), Some("nodes"));
        assert_eq!(by_name.arn, None);
    }
}
