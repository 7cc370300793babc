//! Cluster autoscaler configuration
//!
//! The block is sent whole. Removing it on update sends `null`, which turns
//! the custom configuration off.

use std::collections::BTreeMap;

use spotform_core::{
    AttributeSchema, AttributeType, Attributes, BlockView, ConfigError, Configuration,
    FieldDescriptor, FieldError, FieldMapping, FieldName, FieldRegistry, Nullable, RegistryError,
    Value,
};

use crate::payloads::Cluster;
use crate::payloads::ocean::{AutoScaler, AutoScalerDown, Headroom, ResourceLimits};
use crate::utils::{block_changed, insert_present};

pub fn setup(registry: &mut FieldRegistry<Cluster>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "autoscaler",
            AttributeType::single_block(vec![
                AttributeSchema::new("autoscale_is_enabled", AttributeType::Bool),
                AttributeSchema::new("autoscale_is_auto_config", AttributeType::Bool),
                AttributeSchema::new("autoscale_cooldown", AttributeType::Int),
                AttributeSchema::new(
                    "autoscale_headroom",
                    AttributeType::single_block(vec![
                        AttributeSchema::new("cpu_per_unit", AttributeType::Int),
                        AttributeSchema::new("memory_per_unit", AttributeType::Int),
                        AttributeSchema::new("num_of_units", AttributeType::Int),
                    ]),
                ),
                AttributeSchema::new(
                    "autoscale_down",
                    AttributeType::single_block(vec![
                        AttributeSchema::new("evaluation_periods", AttributeType::Int),
                        AttributeSchema::new("max_scale_down_percentage", AttributeType::Float),
                    ]),
                ),
                AttributeSchema::new(
                    "resource_limits",
                    AttributeType::single_block(vec![
                        AttributeSchema::new("max_vcpu", AttributeType::Int),
                        AttributeSchema::new("max_memory_gib", AttributeType::Int),
                    ]),
                ),
            ]),
        ),
        AutoScalerBlock,
    ))
}

struct AutoScalerBlock;

fn expand(block: &BlockView<'_>) -> Result<AutoScaler, ConfigError> {
    let headroom = block
        .get_block("autoscale_headroom")?
        .map(|h| -> Result<_, ConfigError> {
            Ok(Headroom {
                cpu_per_unit: h.get_int("cpu_per_unit")?,
                memory_per_unit: h.get_int("memory_per_unit")?,
                num_of_units: h.get_int("num_of_units")?,
            })
        })
        .transpose()?;

    let down = block
        .get_block("autoscale_down")?
        .map(|d| -> Result<_, ConfigError> {
            Ok(AutoScalerDown {
                evaluation_periods: d.get_int("evaluation_periods")?,
                max_scale_down_percentage: d.get_float("max_scale_down_percentage")?,
            })
        })
        .transpose()?;

    let resource_limits = block
        .get_block("resource_limits")?
        .map(|l| -> Result<_, ConfigError> {
            Ok(ResourceLimits {
                max_vcpu: l.get_int("max_vcpu")?,
                max_memory_gib: l.get_int("max_memory_gib")?,
            })
        })
        .transpose()?;

    Ok(AutoScaler {
        is_enabled: block.get_bool("autoscale_is_enabled")?,
        is_auto_config: block.get_bool("autoscale_is_auto_config")?,
        cooldown: block.get_int("autoscale_cooldown")?,
        headroom,
        down,
        resource_limits,
    })
}

fn flatten(scaler: &AutoScaler) -> Value {
    let mut block = BTreeMap::new();
    insert_present(&mut block, "autoscale_is_enabled", scaler.is_enabled);
    insert_present(&mut block, "autoscale_is_auto_config", scaler.is_auto_config);
    insert_present(&mut block, "autoscale_cooldown", scaler.cooldown);

    if let Some(headroom) = &scaler.headroom {
        let mut nested = BTreeMap::new();
        insert_present(&mut nested, "cpu_per_unit", headroom.cpu_per_unit);
        insert_present(&mut nested, "memory_per_unit", headroom.memory_per_unit);
        insert_present(&mut nested, "num_of_units", headroom.num_of_units);
        block.insert("autoscale_headroom".to_string(), Value::block(nested));
    }
    if let Some(down) = &scaler.down {
        let mut nested = BTreeMap::new();
        insert_present(&mut nested, "evaluation_periods", down.evaluation_periods);
        insert_present(
            &mut nested,
            "max_scale_down_percentage",
            down.max_scale_down_percentage,
        );
        block.insert("autoscale_down".to_string(), Value::block(nested));
    }
    if let Some(limits) = &scaler.resource_limits {
        let mut nested = BTreeMap::new();
        insert_present(&mut nested, "max_vcpu", limits.max_vcpu);
        insert_present(&mut nested, "max_memory_gib", limits.max_memory_gib);
        block.insert("resource_limits".to_string(), Value::block(nested));
    }

    Value::block(block)
}

impl FieldMapping<Cluster> for AutoScalerBlock {
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut Cluster,
    ) -> Result<(), FieldError> {
        if let Some(block) = config.get_block(field.as_str())? {
            payload.auto_scaler = Nullable::Value(expand(&block)?);
        }
        Ok(())
    }

    fn decode(
        &self,
        field: &FieldName,
        payload: &Cluster,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        let value = match payload.auto_scaler.value() {
            Some(scaler) => flatten(scaler),
            None => Value::List(Vec::new()),
        };
        config.set(field.as_str(), value);
        Ok(())
    }

    fn has_changed(&self, field: &FieldName, config: &Configuration, _payload: &Cluster) -> bool {
        block_changed(config, field.as_str())
    }

    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut Cluster,
    ) -> Result<(), FieldError> {
        payload.auto_scaler = match config.get_block(field.as_str())? {
            Some(block) => Nullable::Value(expand(&block)?),
            None => Nullable::Null,
        };
        Ok(())
    }
}
