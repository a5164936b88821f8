use std::sync::{Mutex, OnceLock};

use crate::container::autowiring::{Arguments, Constructor};
use crate::container::binding::Binding;
use crate::container::descriptor::TypeDescriptor;
use crate::container::instance::Instance;
use crate::container::resolver::{ResolutionPath, Resolver};
use crate::container::scope::Lifetime;
use crate::container::tokens::Token;
use crate::errors::{ContainerError, Result};

/// Deferred construction strategy of one binding
pub(crate) trait Provider: Send + Sync {
    fn provide(&self, resolver: &Resolver, path: &mut ResolutionPath) -> Result<Instance>;
}

/// Builds a new instance on every call
pub(crate) struct TransientProvider {
    implementation: TypeDescriptor,
    type_argument: Option<TypeDescriptor>,
    constructor: Constructor,
}

impl TransientProvider {
    pub(crate) fn new(binding: &Binding) -> Self {
        Self {
            implementation: binding.implementation().clone(),
            type_argument: binding.type_argument().cloned(),
            constructor: binding.constructor().clone(),
        }
    }
}

impl Provider for TransientProvider {
    fn provide(&self, resolver: &Resolver, path: &mut ResolutionPath) -> Result<Instance> {
        let values = self
            .constructor
            .parameters()
            .iter()
            .map(|parameter| resolver.resolve_within(parameter.ty(), parameter.name(), path))
            .collect::<Result<Vec<_>>>()?;

        let arguments = Arguments::new(
            self.implementation.clone(),
            self.type_argument.clone(),
            values,
        );
        let value = self.constructor.invoke(arguments)?;
        Ok(Instance::new(self.implementation.clone(), value))
    }
}

/// Runs the wrapped provider at most once and shares the result.
///
/// Every singleton owns its lock, so unrelated singletons never contend.
pub(crate) struct SingletonProvider {
    inner: Box<dyn Provider>,
    instance: OnceLock<Instance>,
    init_lock: Mutex<()>,
    resource: String,
}

impl SingletonProvider {
    pub(crate) fn new(inner: Box<dyn Provider>, implementation: &TypeDescriptor) -> Self {
        Self {
            inner,
            instance: OnceLock::new(),
            init_lock: Mutex::new(()),
            resource: format!("singleton {}", implementation),
        }
    }
}

impl Provider for SingletonProvider {
    fn provide(&self, resolver: &Resolver, path: &mut ResolutionPath) -> Result<Instance> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance.clone());
        }

        let _guard = self
            .init_lock
            .lock()
            .map_err(|_| ContainerError::lock_error(self.resource.as_str()))?;

        // Another caller may have finished while we waited
        if let Some(instance) = self.instance.get() {
            return Ok(instance.clone());
        }

        let instance = self.inner.provide(resolver, path)?;
        tracing::trace!(resource = %self.resource, "Singleton instance created");
        Ok(self.instance.get_or_init(|| instance).clone())
    }
}

/// A provider together with the binding it was built from
pub(crate) struct ProviderEntry {
    binding: Binding,
    specialized: bool,
    provider: Box<dyn Provider>,
}

impl ProviderEntry {
    /// Transient base strategy, wrapped for singleton lifetimes
    pub(crate) fn new(binding: Binding, specialized: bool) -> Self {
        let transient: Box<dyn Provider> = Box::new(TransientProvider::new(&binding));
        let provider: Box<dyn Provider> = match binding.lifetime() {
            Lifetime::Transient => transient,
            Lifetime::Singleton => Box::new(SingletonProvider::new(
                transient,
                binding.implementation(),
            )),
        };
        Self {
            binding,
            specialized,
            provider,
        }
    }

    pub(crate) fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(crate) fn implementation(&self) -> &TypeDescriptor {
        self.binding.implementation()
    }

    pub(crate) fn name(&self) -> Option<&Token> {
        self.binding.name()
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.binding.lifetime()
    }

    /// Whether the entry was produced by specializing an open binding
    pub(crate) fn is_specialized(&self) -> bool {
        self.specialized
    }

    /// Produce an instance, tracking the implementation on the resolution path
    pub(crate) fn provide(&self, resolver: &Resolver, path: &mut ResolutionPath) -> Result<Instance> {
        path.enter(self.binding.dependency(), self.implementation())?;
        let result = self.provider.provide(resolver, path);
        path.exit();
        result
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("binding", &self.binding)
            .field("specialized", &self.specialized)
            .finish_non_exhaustive()
    }
}
