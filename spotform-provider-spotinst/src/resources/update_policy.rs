//! How running instances are replaced after an update
//!
//! Shared by every resource type that supports rolling. The attribute is
//! provider-side: it is diffed and kept in state but never sent in a
//! payload. The resource handler reads it after a successful update.

use spotform_core::{
    AttributeSchema, AttributeType, Attributes, ConfigError, FieldDescriptor, FieldRegistry,
    RegistryError,
};

pub const FIELD: &str = "update_policy";

/// Batch size used when `roll_config` omits it
pub const DEFAULT_BATCH_SIZE_PERCENTAGE: i64 = 20;

pub fn setup<P: 'static>(registry: &mut FieldRegistry<P>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::local(AttributeSchema::new(
        FIELD,
        AttributeType::single_block(vec![
            AttributeSchema::new("should_roll", AttributeType::Bool).required(),
            AttributeSchema::new(
                "roll_config",
                AttributeType::single_block(vec![
                    AttributeSchema::new("batch_size_percentage", AttributeType::Int)
                        .with_default(DEFAULT_BATCH_SIZE_PERCENTAGE),
                    AttributeSchema::new("health_check_type", AttributeType::String),
                    AttributeSchema::new("grace_period", AttributeType::Int),
                ]),
            ),
        ]),
    )))
}

/// A roll requested through `update_policy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollPolicy {
    pub batch_size_percentage: i64,
    pub health_check_type: Option<String>,
    pub grace_period: Option<i64>,
}

impl RollPolicy {
    /// The roll to run after an update, if `should_roll` is set
    pub fn from_config(config: &impl Attributes) -> Result<Option<Self>, ConfigError> {
        let Some(policy) = config.get_block(FIELD)? else {
            return Ok(None);
        };
        if policy.get_bool("should_roll")? != Some(true) {
            return Ok(None);
        }

        let roll_config = policy.get_block("roll_config")?;
        let get_int = |key: &str| match &roll_config {
            Some(block) => block.get_int(key),
            None => Ok(None),
        };
        Ok(Some(Self {
            batch_size_percentage: get_int("batch_size_percentage")?
                .unwrap_or(DEFAULT_BATCH_SIZE_PERCENTAGE),
            health_check_type: match &roll_config {
                Some(block) => block.get_string("health_check_type")?.filter(|s| !s.is_empty()),
                None => None,
            },
            grace_period: get_int("grace_period")?,
        }))
    }
}
