use crate::container::descriptor::TypeDescriptor;
use crate::container::tokens::Token;
use thiserror::Error;

/// Error type for registration and resolution
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Dependency of type {dependency} is not registered")]
    DependencyNotRegistered { dependency: TypeDescriptor },

    #[error("Dependency of type {dependency} with name {name} is not registered")]
    NamedDependencyNotRegistered {
        dependency: TypeDescriptor,
        name: Token,
    },

    #[error("Implementation {implementation} is already registered for {dependency}")]
    ImplementationAlreadyRegistered {
        dependency: TypeDescriptor,
        implementation: TypeDescriptor,
    },

    #[error("Name {name} is already registered for {dependency}")]
    NameAlreadyRegistered {
        dependency: TypeDescriptor,
        name: Token,
    },

    #[error("No suitable constructor found for type {implementation}")]
    NoSuitableConstructor { implementation: TypeDescriptor },

    #[error("Invalid binding {dependency} -> {implementation}: {reason}")]
    InvalidBinding {
        dependency: TypeDescriptor,
        implementation: TypeDescriptor,
        reason: String,
    },

    #[error("Invalid lifetime: {lifetime}")]
    InvalidLifetime { lifetime: String },

    #[error("Circular dependency detected: {path}")]
    CircularDependency { path: String },

    #[error("Resolution depth of {depth} exceeded: {path}")]
    ResolutionDepthExceeded { depth: usize, path: String },

    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Constructor of {implementation} requested more arguments than it declared")]
    ArgumentsExhausted { implementation: TypeDescriptor },

    #[error("Activation of {implementation} failed: {source}")]
    Activation {
        implementation: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },
}

impl ContainerError {
    /// Create the "not registered" error for a dependency and optional name
    pub fn not_registered(dependency: TypeDescriptor, name: Option<Token>) -> Self {
        match name {
            Some(name) => Self::NamedDependencyNotRegistered { dependency, name },
            None => Self::DependencyNotRegistered { dependency },
        }
    }

    /// Wrap a failure raised while building an implementation
    pub fn activation(
        implementation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Activation {
            implementation: implementation.into(),
            source: source.into(),
        }
    }

    /// Create a lock error for a named resource
    pub fn lock_error(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Check if the error reports a missing dependency
    pub fn is_not_registered(&self) -> bool {
        matches!(
            self,
            Self::DependencyNotRegistered { .. } | Self::NamedDependencyNotRegistered { .. }
        )
    }

    /// Check if the error was raised by binding validation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ImplementationAlreadyRegistered { .. }
                | Self::NameAlreadyRegistered { .. }
                | Self::NoSuitableConstructor { .. }
                | Self::InvalidBinding { .. }
        )
    }

    /// The dependency a "not registered" error refers to
    pub fn dependency(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::DependencyNotRegistered { dependency, .. }
            | Self::NamedDependencyNotRegistered { dependency, .. } => Some(dependency),
            _ => None,
        }
    }

    /// The requested name a "not registered" error refers to
    pub fn requested_name(&self) -> Option<&Token> {
        match self {
            Self::NamedDependencyNotRegistered { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;
