//! Provider - Traits the CRUD layer implements on top of resource definitions
//!
//! The mapping engine never performs network calls. A provider wraps each
//! resource definition in a handler that calls the vendor API with the
//! payloads the engine produces; these traits are the object-safe surface
//! through which a host drives those handlers by resource name.

use std::future::Future;
use std::pin::Pin;

use crate::config::Configuration;
use crate::error::MappingError;
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    /// Resource type and instance ID, when known
    pub resource: Option<(String, Option<String>)>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.resource {
            Some((resource_type, Some(id))) => {
                write!(f, "[{}.{}] {}", resource_type, id, self.message)
            }
            Some((resource_type, None)) => write!(f, "[{}] {}", resource_type, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, resource_type: impl Into<String>, id: Option<&str>) -> Self {
        self.resource = Some((resource_type.into(), id.map(str::to_string)));
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl From<MappingError> for ProviderError {
    fn from(err: MappingError) -> Self {
        ProviderError::new(err.to_string()).with_cause(err)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle of one resource type, driven with host configurations
///
/// Every call receives the configuration of a single instance and leaves it
/// in the state the host should persist: `create` sets the ID, `read`
/// refreshes values (or clears the ID when the instance is gone), `delete`
/// clears the ID.
pub trait ResourceLifecycle: Send + Sync {
    /// Resource type name (e.g., "spotinst_ocean_aws")
    fn name(&self) -> &str;

    /// Composed schema of this resource type
    fn schema(&self) -> &ResourceSchema;

    fn create<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>>;

    fn read<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>>;

    /// Returns whether the vendor API was called
    fn update<'a>(&'a self, config: &'a mut Configuration)
    -> BoxFuture<'a, ProviderResult<bool>>;

    fn delete<'a>(&'a self, config: &'a mut Configuration) -> BoxFuture<'a, ProviderResult<()>>;

    /// Adopt an existing remote instance by ID
    fn import<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ProviderResult<Configuration>>;
}

/// Main Provider trait
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "spotinst")
    fn name(&self) -> &'static str;

    /// Every resource type this Provider handles, in a stable order
    fn resources(&self) -> Vec<&dyn ResourceLifecycle>;

    fn resource(&self, name: &str) -> Option<&dyn ResourceLifecycle> {
        self.resources().into_iter().find(|r| r.name() == name)
    }
}
