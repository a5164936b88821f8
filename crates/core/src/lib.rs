//! Dependency injection registry and resolver.
//!
//! Bindings are declared on a [`DependenciesConfiguration`], frozen into a
//! [`Registry`] and handed to a [`Resolver`], which builds object graphs on
//! demand:
//!
//! ```rust
//! use std::sync::Arc;
//! use injector::implements;
//! use injector::{ConstructorSpec, DependenciesConfiguration, Injectable, Parameter, Resolver};
//!
//! trait Repository: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct MemoryRepository;
//! impl Repository for MemoryRepository {
//!     fn name(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//! impl Injectable for MemoryRepository {
//!     fn constructors() -> Vec<ConstructorSpec<Self>> {
//!         vec![ConstructorSpec::nullary(|| MemoryRepository)]
//!     }
//! }
//! implements!(MemoryRepository => dyn Repository);
//!
//! struct Service {
//!     repository: Arc<dyn Repository>,
//! }
//! impl Injectable for Service {
//!     fn constructors() -> Vec<ConstructorSpec<Self>> {
//!         vec![ConstructorSpec::new(
//!             vec![Parameter::of::<dyn Repository>()],
//!             |arguments| Ok(Service { repository: arguments.next()? }),
//!         )]
//!     }
//! }
//!
//! let mut configuration = DependenciesConfiguration::new();
//! configuration
//!     .register::<dyn Repository, MemoryRepository>()?
//!     .register::<Service, Service>()?;
//!
//! let resolver = Resolver::new(configuration.into_registry());
//! let service = resolver.get::<Service>()?;
//! assert_eq!(service.repository.name(), "memory");
//! # Ok::<(), injector::ContainerError>(())
//! ```

pub mod config;
pub mod container;
pub mod errors;

pub use config::{ConfigError, ConfigLoader, ConfigSource, ResolverConfig};
pub use container::{
    into_handle, Arguments, Binding, BindingBuilder, Constructor, ConstructorSpec,
    DependenciesConfiguration, GenericDefinition, GenericFamily, Implements, Injectable, Instance,
    Lifetime, Parameter, Registry, ResolutionPath, Resolver, ResolverStatistics, ServiceHandle,
    Token, TypeDescriptor,
};
pub use errors::{ContainerError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
