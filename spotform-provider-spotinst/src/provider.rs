//! SpotinstProvider - Resource handlers for every Spotinst resource type

use std::sync::Arc;

use spotform_core::provider::{Provider, ResourceLifecycle};
use spotform_core::RegistryError;

use crate::api::{InMemoryApi, ResourceApi};
use crate::config::ProviderConfig;
use crate::handler::ResourceHandler;
use crate::payloads::{Cluster, Group};
use crate::resources::Resources;

pub struct SpotinstProvider {
    config: ProviderConfig,
    elastigroup_aws: ResourceHandler<Group>,
    ocean_aws: ResourceHandler<Cluster>,
}

impl SpotinstProvider {
    pub fn new(
        config: ProviderConfig,
        resources: &Resources,
        groups: Arc<dyn ResourceApi<Group>>,
        clusters: Arc<dyn ResourceApi<Cluster>>,
    ) -> Self {
        Self {
            elastigroup_aws: ResourceHandler::new(
                resources.elastigroup_aws.clone(),
                groups,
                config.retry.clone(),
            ),
            ocean_aws: ResourceHandler::new(
                resources.ocean_aws.clone(),
                clusters,
                config.retry.clone(),
            ),
            config,
        }
    }

    /// A provider backed by in-memory APIs
    pub fn in_memory(config: ProviderConfig) -> Result<Self, RegistryError> {
        let resources = Resources::new()?;
        let groups = InMemoryApi::<Group>::new("sig").with_account(config.account.clone());
        let clusters = InMemoryApi::<Cluster>::new("o").with_account(config.account.clone());
        Ok(Self::new(config, &resources, Arc::new(groups), Arc::new(clusters)))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn elastigroup_aws(&self) -> &ResourceHandler<Group> {
        &self.elastigroup_aws
    }

    pub fn ocean_aws(&self) -> &ResourceHandler<Cluster> {
        &self.ocean_aws
    }
}

impl Provider for SpotinstProvider {
    fn name(&self) -> &'static str {
        "spotinst"
    }

    fn resources(&self) -> Vec<&dyn ResourceLifecycle> {
        vec![
            &self.elastigroup_aws as &dyn ResourceLifecycle,
            &self.ocean_aws as &dyn ResourceLifecycle,
        ]
    }
}
