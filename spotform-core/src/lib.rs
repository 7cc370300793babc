//! Spotform Core
//!
//! Field registry and dual-direction mapping engine for declarative resource
//! providers. Independently authored facets register named fields, each
//! owning a schema fragment and the logic to expand configuration into a
//! typed API payload and to flatten a payload back into configuration.
//!
//! ## Module Structure
//!
//! - `value` / `config` - Flat configuration values and typed access
//! - `schema` - Schema fragments and the composed resource schema
//! - `field` / `mapping` - Field descriptors and reusable mapping strategies
//! - `registry` - Ordered, uniqueness-checked field registry
//! - `resource` - Resource definitions and the create/read/update passes
//! - `differ` - Change tracking for sparse updates
//! - `payload` - Payload trait, substructure allocation, nullable fields
//! - `provider` - Object-safe lifecycle traits for the CRUD layer

pub mod config;
pub mod differ;
pub mod error;
pub mod field;
pub mod mapping;
pub mod payload;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod value;

pub use config::{Attributes, BlockView, ConfigValue, Configuration};
pub use differ::{ChangeTracker, UpdateOutcome};
pub use error::{ConfigError, FieldError, MappingError, RegistryError};
pub use field::{FieldDescriptor, FieldMapping, FieldName, FieldScope};
pub use mapping::{AbsencePolicy, ConflictsWith, LocalOnly, Scalar, SentinelInt};
pub use payload::{Merge, Nullable, Payload, ensure};
pub use registry::FieldRegistry;
pub use resource::{Facet, ResourceDefinition};
pub use schema::{AttributeMode, AttributeSchema, AttributeType, ResourceSchema, TypeError};
pub use value::Value;
