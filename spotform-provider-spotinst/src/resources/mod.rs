//! Resource definitions of the Spotinst provider
//!
//! Each resource type is a directory of facets; [`Resources`] composes all
//! of them once at startup and shares them read-only afterwards.

pub mod elastigroup_aws;
pub mod ocean_aws;
pub mod update_policy;

use std::sync::Arc;

use spotform_core::{RegistryError, ResourceDefinition};

use crate::payloads::{Cluster, Group};

/// Every resource definition of the provider, composed once
#[derive(Debug, Clone)]
pub struct Resources {
    pub elastigroup_aws: Arc<ResourceDefinition<Group>>,
    pub ocean_aws: Arc<ResourceDefinition<Cluster>>,
}

impl Resources {
    /// Compose every resource type
    ///
    /// A duplicate or malformed field name in any facet aborts provider
    /// initialization.
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            elastigroup_aws: Arc::new(elastigroup_aws::definition()?),
            ocean_aws: Arc::new(ocean_aws::definition()?),
        })
    }

    /// Names of all resource types, in a stable order
    pub fn names() -> [&'static str; 2] {
        [elastigroup_aws::NAME, ocean_aws::NAME]
    }
}
