//! Spotform Spotinst Provider
//!
//! Elastigroup and Ocean resources built on the spotform mapping engine.
//!
//! ## Module Structure
//!
//! - `payloads` - Typed API request/response objects
//! - `resources` - Facets composing each resource definition
//! - `api` - Vendor API trait and the in-memory implementation
//! - `handler` - CRUD of one resource type on top of the engine passes
//! - `retry` - Retry of calls rejected with a transient error code
//! - `config` - Provider-level configuration
//! - `provider` - SpotinstProvider
//! - `utils` - Conversions between configuration and API shapes

pub mod api;
pub mod config;
pub mod handler;
pub mod payloads;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod utils;

// Re-export main types
pub use api::{ApiError, ApiResult, InMemoryApi, ResourceApi};
pub use config::{ProviderConfig, ProviderConfigError};
pub use handler::ResourceHandler;
pub use provider::SpotinstProvider;
pub use resources::Resources;
pub use retry::RetryPolicy;
