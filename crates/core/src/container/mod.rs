pub mod autowiring;
pub mod binding;
pub mod descriptor;
pub mod instance;
mod provider;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod tokens;

pub use autowiring::{
    Arguments, Constructor, ConstructorSpec, Factory, Implements, Injectable, Parameter,
};
pub use binding::{Binding, BindingBuilder, DependenciesConfiguration};
pub use descriptor::{GenericDefinition, GenericFamily, TypeDescriptor};
pub use instance::{into_handle, Instance, ServiceHandle};
pub use registry::Registry;
pub use resolver::{ResolutionPath, Resolver, ResolverStatistics};
pub use scope::Lifetime;
pub use tokens::{Token, TokenValue};
