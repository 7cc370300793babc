//! Resource handler - CRUD for one resource type
//!
//! Runs the mapping engine passes of a [`ResourceDefinition`] and sends the
//! resulting payloads to a [`ResourceApi`], retrying calls the API rejects
//! with the retryable error code.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};
use spotform_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceLifecycle};
use spotform_core::{Configuration, MappingError, Payload, ResourceDefinition, ResourceSchema};

use crate::api::{ApiError, ResourceApi};
use crate::resources::update_policy::RollPolicy;
use crate::retry::{RetryPolicy, with_retry};

pub struct ResourceHandler<P: Payload> {
    definition: Arc<ResourceDefinition<P>>,
    api: Arc<dyn ResourceApi<P>>,
    retry: RetryPolicy,
}

impl<P: Payload + 'static> ResourceHandler<P> {
    pub fn new(
        definition: Arc<ResourceDefinition<P>>,
        api: Arc<dyn ResourceApi<P>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            definition,
            api,
            retry,
        }
    }

    /// Account the underlying API is scoped to
    pub fn account(&self) -> Option<&str> {
        self.api.account()
    }

    pub fn definition(&self) -> &ResourceDefinition<P> {
        &self.definition
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the instance, then read it back so state holds what the API stored
    pub async fn create_resource(&self, config: &mut Configuration) -> ProviderResult<()> {
        let payload = self
            .definition
            .on_create(config)
            .map_err(|e| self.mapping_error(e, None))?;

        let created = with_retry(&self.retry, "create", || self.api.create(&payload))
            .await
            .map_err(|e| self.api_error("create", e, None))?;
        let id = created
            .identity()
            .ok_or_else(|| {
                ProviderError::new("API response carries no ID").for_resource(self.resource_type(), None)
            })?
            .to_string();

        info!("{}: created {}", self.resource_type(), id);
        config.set_id(id);
        self.read_resource(config).await
    }

    /// Refresh configuration from the API
    ///
    /// An instance that no longer exists gets its ID cleared so the host
    /// drops it from state.
    pub async fn read_resource(&self, config: &mut Configuration) -> ProviderResult<()> {
        let id = self.require_id(config)?;

        let found = match with_retry(&self.retry, "read", || self.api.read(&id)).await {
            Ok(found) => found,
            Err(ApiError::NotFound(_)) => None,
            Err(e) => return Err(self.api_error("read", e, Some(&id))),
        };

        match found {
            Some(payload) => self
                .definition
                .on_read(&payload, config)
                .map_err(|e| self.mapping_error(e, Some(&id))),
            None => {
                warn!("{}: {} not found, removing from state", self.resource_type(), id);
                config.clear_id();
                Ok(())
            }
        }
    }

    /// Send the changed fields, roll if requested, then refresh
    ///
    /// Returns whether the update call was made. Changes to provider-side
    /// fields alone never reach the API.
    pub async fn update_resource(&self, config: &mut Configuration) -> ProviderResult<bool> {
        let id = self.require_id(config)?;
        let outcome = self
            .definition
            .on_update(config)
            .map_err(|e| self.mapping_error(e, Some(&id)))?;
        let roll = RollPolicy::from_config(&*config).map_err(|e| {
            ProviderError::new(format!("Invalid update_policy: {}", e))
                .for_resource(self.resource_type(), Some(&id))
                .with_cause(e)
        })?;

        if !outcome.should_update() {
            info!("{}: {} has no remote changes", self.resource_type(), id);
            self.read_resource(config).await?;
            return Ok(false);
        }

        info!(
            "{}: updating {} ({})",
            self.resource_type(),
            id,
            outcome
                .changes
                .changed_fields()
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        with_retry(&self.retry, "update", || self.api.update(&outcome.payload))
            .await
            .map_err(|e| self.api_error("update", e, Some(&id)))?;

        if let Some(policy) = roll {
            info!(
                "{}: rolling {} in batches of {}%",
                self.resource_type(),
                id,
                policy.batch_size_percentage
            );
            with_retry(&self.retry, "roll", || self.api.roll(&id, &policy))
                .await
                .map_err(|e| self.api_error("roll", e, Some(&id)))?;
        }

        self.read_resource(config).await?;
        Ok(true)
    }

    /// Delete the instance; an instance that is already gone is not an error
    pub async fn delete_resource(&self, config: &mut Configuration) -> ProviderResult<()> {
        let id = self.require_id(config)?;

        match with_retry(&self.retry, "delete", || self.api.delete(&id)).await {
            Ok(()) => info!("{}: deleted {}", self.resource_type(), id),
            Err(ApiError::NotFound(_)) => warn!("{}: {} was already deleted", self.resource_type(), id),
            Err(e) => return Err(self.api_error("delete", e, Some(&id))),
        }
        config.clear_id();
        Ok(())
    }

    /// Adopt an existing instance by ID
    pub async fn import_resource(&self, id: &str) -> ProviderResult<Configuration> {
        let mut config = Configuration::from_state(id, BTreeMap::new());
        self.read_resource(&mut config).await?;
        if config.id().is_none() {
            return Err(ProviderError::new("Cannot import: instance not found")
                .for_resource(self.resource_type(), Some(id)));
        }
        config.commit();
        Ok(config)
    }

    // =========================================================================
    // Error Helpers
    // =========================================================================

    fn resource_type(&self) -> &str {
        self.definition.name()
    }

    fn require_id(&self, config: &Configuration) -> ProviderResult<String> {
        config.id().map(str::to_string).ok_or_else(|| {
            ProviderError::new("Instance has no ID").for_resource(self.resource_type(), None)
        })
    }

    fn mapping_error(&self, err: MappingError, id: Option<&str>) -> ProviderError {
        ProviderError::from(err).for_resource(self.resource_type(), id)
    }

    fn api_error(&self, operation: &str, err: ApiError, id: Option<&str>) -> ProviderError {
        ProviderError::new(format!("Failed to {}: {}", operation, err))
            .for_resource(self.resource_type(), id)
            .with_cause(err)
    }
}

impl<P: Payload + 'static> ResourceLifecycle for ResourceHandler<P> {
    fn name(&self) -> &str {
        self.definition.name()
    }

    fn schema(&self) -> &ResourceSchema {
        self.definition.schema()
    }

    fn create<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.create_resource(config))
    }

    fn read<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.read_resource(config))
    }

    fn update<'a>(
        &'a self,
        config: &'a mut Configuration,
    ) -> BoxFuture<'a, ProviderResult<bool>> {
        Box::pin(self.update_resource(config))
    }

    fn delete<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_resource(config))
    }

    fn import<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ProviderResult<Configuration>> {
        Box::pin(self.import_resource(id))
    }
}
