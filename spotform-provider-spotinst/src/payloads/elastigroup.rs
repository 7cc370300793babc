//! Elastigroup payload (`/aws/ec2/group`)

use serde::{Deserialize, Serialize};
use spotform_core::payload::{merge_nested, merge_nullable, merge_option};
use spotform_core::{Merge, Nullable, Payload, ensure};

use super::common::{Capacity, Tag};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub description: Nullable<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<Compute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<Scheduling>,
}

impl Group {
    pub fn capacity_mut(&mut self) -> &mut Capacity {
        ensure(&mut self.capacity)
    }

    pub fn strategy_mut(&mut self) -> &mut Strategy {
        ensure(&mut self.strategy)
    }

    pub fn compute(&self) -> Option<&Compute> {
        self.compute.as_ref()
    }

    pub fn compute_mut(&mut self) -> &mut Compute {
        ensure(&mut self.compute)
    }

    pub fn instance_types(&self) -> Option<&InstanceTypes> {
        self.compute()?.instance_types.as_ref()
    }

    pub fn instance_types_mut(&mut self) -> &mut InstanceTypes {
        ensure(&mut self.compute_mut().instance_types)
    }

    pub fn launch_spec(&self) -> Option<&LaunchSpecification> {
        self.compute()?.launch_specification.as_ref()
    }

    pub fn launch_spec_mut(&mut self) -> &mut LaunchSpecification {
        ensure(&mut self.compute_mut().launch_specification)
    }

    pub fn scheduling_mut(&mut self) -> &mut Scheduling {
        ensure(&mut self.scheduling)
    }
}

impl Payload for Group {
    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn with_identity(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl Merge for Group {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.id, patch.id);
        merge_option(&mut self.name, patch.name);
        merge_nullable(&mut self.description, patch.description);
        merge_option(&mut self.region, patch.region);
        merge_nested(&mut self.capacity, patch.capacity);
        merge_nested(&mut self.strategy, patch.strategy);
        merge_nested(&mut self.compute, patch.compute);
        merge_nested(&mut self.scheduling, patch.scheduling);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Percentage of spot instances
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub risk: Nullable<f64>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub on_demand_count: Nullable<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_vs_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draining_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_to_od: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilize_reserved_instances: Option<bool>,
}

impl Merge for Strategy {
    fn merge(&mut self, patch: Self) {
        merge_nullable(&mut self.risk, patch.risk);
        merge_nullable(&mut self.on_demand_count, patch.on_demand_count);
        merge_option(&mut self.availability_vs_cost, patch.availability_vs_cost);
        merge_option(&mut self.draining_timeout, patch.draining_timeout);
        merge_option(&mut self.fallback_to_od, patch.fallback_to_od);
        merge_option(
            &mut self.utilize_reserved_instances,
            patch.utilize_reserved_instances,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compute {
    /// e.g. "Linux/UNIX"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zones: Option<Vec<AvailabilityZone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_types: Option<InstanceTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_specification: Option<LaunchSpecification>,
}

impl Merge for Compute {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.product, patch.product);
        merge_option(&mut self.availability_zones, patch.availability_zones);
        merge_option(&mut self.subnet_ids, patch.subnet_ids);
        merge_nested(&mut self.instance_types, patch.instance_types);
        merge_nested(&mut self.launch_specification, patch.launch_specification);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityZone {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_demand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub preferred_spot: Nullable<Vec<String>>,
}

impl Merge for InstanceTypes {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.on_demand, patch.on_demand);
        merge_option(&mut self.spot, patch.spot);
        merge_nullable(&mut self.preferred_spot, patch.preferred_spot);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub key_pair: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub user_data: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub health_check_type: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub health_check_grace_period: Nullable<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Merge for LaunchSpecification {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.image_id, patch.image_id);
        merge_option(&mut self.security_group_ids, patch.security_group_ids);
        merge_nullable(&mut self.key_pair, patch.key_pair);
        merge_nullable(&mut self.user_data, patch.user_data);
        merge_nullable(&mut self.health_check_type, patch.health_check_type);
        merge_nullable(
            &mut self.health_check_grace_period,
            patch.health_check_grace_period,
        );
        merge_option(&mut self.monitoring, patch.monitoring);
        merge_option(&mut self.tags, patch.tags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    /// Replaced as a whole on update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<ScheduledTask>>,
}

impl Merge for Scheduling {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.tasks, patch.tasks);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_target_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_min_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_max_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size_percentage: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_update_serialization() {
        let mut group = Group::with_identity("sig-1");
        group.capacity_mut().maximum = Some(10);
        group.launch_spec_mut().health_check_type = Nullable::Null;

        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "id": "sig-1",
                "capacity": { "maximum": 10 },
                "compute": { "launchSpecification": { "healthCheckType": null } }
            })
        );
    }

    #[test]
    fn test_response_deserialization() {
        let group: Group = serde_json::from_value(json!({
            "id": "sig-2",
            "name": "web",
            "strategy": { "risk": 100, "fallbackToOd": true },
            "compute": {
                "product": "Linux/UNIX",
                "launchSpecification": { "healthCheckGracePeriod": 300 }
            }
        }))
        .unwrap();

        assert_eq!(group.identity(), Some("sig-2"));
        assert_eq!(group.strategy.as_ref().unwrap().risk, Nullable::Value(100.0));
        assert_eq!(
            group.launch_spec().unwrap().health_check_grace_period,
            Nullable::Value(300)
        );
        assert!(group.description.is_unset());
    }

    #[test]
    fn test_merge_applies_only_present_members() {
        let mut stored = Group::with_identity("sig-1");
        stored.name = Some("web".to_string());
        stored.capacity_mut().minimum = Some(1);
        stored.capacity_mut().maximum = Some(5);
        stored.launch_spec_mut().health_check_type = Nullable::Value("ELB".to_string());

        let mut patch = Group::with_identity("sig-1");
        patch.capacity_mut().maximum = Some(10);
        patch.launch_spec_mut().health_check_type = Nullable::Null;
        stored.merge(patch);

        assert_eq!(stored.name.as_deref(), Some("web"));
        let capacity = stored.capacity.as_ref().unwrap();
        assert_eq!((capacity.minimum, capacity.maximum), (Some(1), Some(10)));
        assert!(stored.launch_spec().unwrap().health_check_type.is_null());
    }
}
