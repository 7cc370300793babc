//! spotinst_elastigroup_aws - A group of spot and on-demand EC2 instances
//!
//! Fields are contributed by independent facets, registered in the order of
//! [`FACETS`]. That order is the order of every expand, flatten and diff pass.

pub mod capacity;
pub mod general;
pub mod instance_types;
pub mod launch_configuration;
pub mod network;
pub mod scheduled_task;
pub mod strategy;
pub mod tags;

use spotform_core::{Facet, RegistryError, ResourceDefinition};

use super::update_policy;
use crate::payloads::Group;

pub const NAME: &str = "spotinst_elastigroup_aws";

pub const FACETS: &[Facet<Group>] = &[
    general::setup,
    capacity::setup,
    strategy::setup,
    launch_configuration::setup,
    instance_types::setup,
    network::setup,
    scheduled_task::setup,
    tags::setup,
    update_policy::setup::<Group>,
];

pub fn definition() -> Result<ResourceDefinition<Group>, RegistryError> {
    ResourceDefinition::with_facets(NAME, FACETS)
}
