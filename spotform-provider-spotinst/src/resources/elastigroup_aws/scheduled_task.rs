//! Scheduled scaling and maintenance tasks
//!
//! The task list is one attribute and is always sent whole; an update that
//! removes every block sends an empty list so the API drops all tasks.

use std::collections::BTreeMap;

use spotform_core::{
    AttributeSchema, AttributeType, Attributes, BlockView, ConfigError, Configuration,
    FieldDescriptor, FieldError, FieldMapping, FieldName, FieldRegistry, RegistryError, Value,
};

use crate::payloads::Group;
use crate::payloads::elastigroup::ScheduledTask;
use crate::utils::{block_changed, insert_present};

pub const TASK_TYPES: &[&str] = &["scale", "backup_ami", "roll", "statefulUpdateCapacity"];

pub fn setup(registry: &mut FieldRegistry<Group>) -> Result<(), RegistryError> {
    registry.register(FieldDescriptor::new(
        AttributeSchema::new(
            "scheduled_task",
            AttributeType::block_list(vec![
                AttributeSchema::new("task_type", AttributeType::enumeration(TASK_TYPES))
                    .required(),
                AttributeSchema::new("cron_expression", AttributeType::String).required(),
                AttributeSchema::new("is_enabled", AttributeType::Bool).with_default(true),
                AttributeSchema::new("scale_target_capacity", AttributeType::Int),
                AttributeSchema::new("scale_min_capacity", AttributeType::Int),
                AttributeSchema::new("scale_max_capacity", AttributeType::Int),
                AttributeSchema::new("batch_size_percentage", AttributeType::Int),
            ]),
        ),
        ScheduledTasks,
    ))
}

struct ScheduledTasks;

impl ScheduledTasks {
    fn expand(config: &Configuration, field: &FieldName) -> Result<Vec<ScheduledTask>, FieldError> {
        let tasks = config
            .get_blocks(field.as_str())?
            .iter()
            .map(expand_task)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

fn expand_task(block: &BlockView<'_>) -> Result<ScheduledTask, ConfigError> {
    Ok(ScheduledTask {
        task_type: block.get_string("task_type")?,
        cron_expression: block.get_string("cron_expression")?,
        is_enabled: block.get_bool("is_enabled")?,
        scale_target_capacity: block.get_int("scale_target_capacity")?,
        scale_min_capacity: block.get_int("scale_min_capacity")?,
        scale_max_capacity: block.get_int("scale_max_capacity")?,
        batch_size_percentage: block.get_int("batch_size_percentage")?,
    })
}

fn flatten_task(task: &ScheduledTask) -> Value {
    let mut block = BTreeMap::new();
    insert_present(&mut block, "task_type", task.task_type.clone());
    insert_present(&mut block, "cron_expression", task.cron_expression.clone());
    insert_present(&mut block, "is_enabled", task.is_enabled);
    insert_present(&mut block, "scale_target_capacity", task.scale_target_capacity);
    insert_present(&mut block, "scale_min_capacity", task.scale_min_capacity);
    insert_present(&mut block, "scale_max_capacity", task.scale_max_capacity);
    insert_present(&mut block, "batch_size_percentage", task.batch_size_percentage);
    Value::Map(block)
}

impl FieldMapping<Group> for ScheduledTasks {
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut Group,
    ) -> Result<(), FieldError> {
        let tasks = Self::expand(config, field)?;
        if !tasks.is_empty() {
            payload.scheduling_mut().tasks = Some(tasks);
        }
        Ok(())
    }

    fn decode(
        &self,
        field: &FieldName,
        payload: &Group,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        let tasks = payload
            .scheduling
            .as_ref()
            .and_then(|s| s.tasks.as_ref())
            .map(|tasks| tasks.iter().map(flatten_task).collect())
            .unwrap_or_default();
        config.set(field.as_str(), Value::List(tasks));
        Ok(())
    }

    fn has_changed(&self, field: &FieldName, config: &Configuration, _payload: &Group) -> bool {
        block_changed(config, field.as_str())
    }

    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut Group,
    ) -> Result<(), FieldError> {
        payload.scheduling_mut().tasks = Some(Self::expand(config, field)?);
        Ok(())
    }
}
