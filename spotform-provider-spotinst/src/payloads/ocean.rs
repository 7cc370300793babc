//! Ocean cluster payload (`/ocean/aws/k8s/cluster`)

use serde::{Deserialize, Serialize};
use spotform_core::payload::{merge_nested, merge_nullable, merge_option};
use spotform_core::{Merge, Nullable, Payload, ensure};

use super::common::{Capacity, Tag};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ClusterStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<ClusterCompute>,
    /// Replaced as a whole; `Null` turns autoscaling configuration off
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub auto_scaler: Nullable<AutoScaler>,
}

impl Cluster {
    pub fn capacity_mut(&mut self) -> &mut Capacity {
        ensure(&mut self.capacity)
    }

    pub fn strategy(&self) -> Option<&ClusterStrategy> {
        self.strategy.as_ref()
    }

    pub fn strategy_mut(&mut self) -> &mut ClusterStrategy {
        ensure(&mut self.strategy)
    }

    pub fn compute(&self) -> Option<&ClusterCompute> {
        self.compute.as_ref()
    }

    pub fn compute_mut(&mut self) -> &mut ClusterCompute {
        ensure(&mut self.compute)
    }

    pub fn instance_types(&self) -> Option<&ClusterInstanceTypes> {
        self.compute()?.instance_types.as_ref()
    }

    pub fn instance_types_mut(&mut self) -> &mut ClusterInstanceTypes {
        ensure(&mut self.compute_mut().instance_types)
    }

    pub fn launch_spec(&self) -> Option<&ClusterLaunchSpecification> {
        self.compute()?.launch_specification.as_ref()
    }

    pub fn launch_spec_mut(&mut self) -> &mut ClusterLaunchSpecification {
        ensure(&mut self.compute_mut().launch_specification)
    }
}

impl Payload for Cluster {
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

impl Merge for Cluster {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.id, patch.id);
        merge_option(&mut self.name, patch.name);
        merge_option(&mut self.controller_cluster_id, patch.controller_cluster_id);
        merge_option(&mut self.region, patch.region);
        merge_nested(&mut self.capacity, patch.capacity);
        merge_nested(&mut self.strategy, patch.strategy);
        merge_nested(&mut self.compute, patch.compute);
        merge_nullable(&mut self.auto_scaler, patch.auto_scaler);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStrategy {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub spot_percentage: Nullable<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_to_od: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilize_reserved_instances: Option<bool>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub draining_timeout: Nullable<i64>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub grace_period: Nullable<i64>,
}

impl Merge for ClusterStrategy {
    fn merge(&mut self, patch: Self) {
        merge_nullable(&mut self.spot_percentage, patch.spot_percentage);
        merge_option(&mut self.fallback_to_od, patch.fallback_to_od);
        merge_option(
            &mut self.utilize_reserved_instances,
            patch.utilize_reserved_instances,
        );
        merge_nullable(&mut self.draining_timeout, patch.draining_timeout);
        merge_nullable(&mut self.grace_period, patch.grace_period);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCompute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_types: Option<ClusterInstanceTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_specification: Option<ClusterLaunchSpecification>,
}

impl Merge for ClusterCompute {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.subnet_ids, patch.subnet_ids);
        merge_nested(&mut self.instance_types, patch.instance_types);
        merge_nested(&mut self.launch_specification, patch.launch_specification);
    }
}

/// At most one of the two lists may be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInstanceTypes {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub whitelist: Nullable<Vec<String>>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub blacklist: Nullable<Vec<String>>,
}

impl Merge for ClusterInstanceTypes {
    fn merge(&mut self, patch: Self) {
        merge_nullable(&mut self.whitelist, patch.whitelist);
        merge_nullable(&mut self.blacklist, patch.blacklist);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLaunchSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub user_data: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub key_pair: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub iam_instance_profile: Nullable<IamInstanceProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associate_public_ip_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Merge for ClusterLaunchSpecification {
    fn merge(&mut self, patch: Self) {
        merge_option(&mut self.image_id, patch.image_id);
        merge_option(&mut self.security_group_ids, patch.security_group_ids);
        merge_nullable(&mut self.user_data, patch.user_data);
        merge_nullable(&mut self.key_pair, patch.key_pair);
        merge_nullable(&mut self.iam_instance_profile, patch.iam_instance_profile);
        merge_option(
            &mut self.associate_public_ip_address,
            patch.associate_public_ip_address,
        );
        merge_option(&mut self.monitoring, patch.monitoring);
        merge_option(&mut self.tags, patch.tags);
    }
}

/// Exactly one of `arn` and `name` is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamInstanceProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_config: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headroom: Option<Headroom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<AutoScalerDown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headroom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_per_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_per_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_of_units: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScalerDown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_periods: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale_down_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_vcpu: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_gib: Option<i64>,
}
