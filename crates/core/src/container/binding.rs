use crate::container::autowiring::{
    select_constructor, Arguments, Constructor, ConstructorSpec, Implements, Injectable,
    Parameter,
};
use crate::container::descriptor::TypeDescriptor;
use crate::container::instance::ServiceHandle;
use crate::container::registry::Registry;
use crate::container::scope::Lifetime;
use crate::container::tokens::Token;
use crate::errors::{ContainerError, Result};

/// Validated mapping from a dependency type to an implementation
#[derive(Debug, Clone)]
pub struct Binding {
    dependency: TypeDescriptor,
    implementation: TypeDescriptor,
    lifetime: Lifetime,
    name: Option<Token>,
    constructor: Constructor,
    type_argument: Option<TypeDescriptor>,
    ordinal: usize,
}

impl Binding {
    pub fn dependency(&self) -> &TypeDescriptor {
        &self.dependency
    }

    pub fn implementation(&self) -> &TypeDescriptor {
        &self.implementation
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn name(&self) -> Option<&Token> {
        self.name.as_ref()
    }

    /// The constructor chosen for the implementation
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Argument this binding was specialized with, if it came from an open binding
    pub fn type_argument(&self) -> Option<&TypeDescriptor> {
        self.type_argument.as_ref()
    }

    /// Position of the binding in global registration order
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether the binding is declared over an unbound generic definition
    pub fn is_open(&self) -> bool {
        self.dependency.is_open()
    }

    /// Check the binding's name against a requested one
    pub fn matches_name(&self, name: Option<&Token>) -> bool {
        match name {
            Some(requested) => self.name.as_ref() == Some(requested),
            None => true,
        }
    }

    /// Close an open binding over `argument`
    pub(crate) fn specialize(&self, argument: &TypeDescriptor) -> Binding {
        Binding {
            dependency: self.dependency.substitute(argument),
            implementation: self.implementation.substitute(argument),
            lifetime: self.lifetime,
            name: self.name.clone(),
            constructor: self.constructor.specialize(argument),
            type_argument: Some(argument.clone()),
            ordinal: self.ordinal,
        }
    }
}

/// Fluent description of a binding, checked when it is registered
#[derive(Debug, Clone)]
pub struct BindingBuilder {
    dependency: TypeDescriptor,
    implementation: TypeDescriptor,
    lifetime: Lifetime,
    name: Option<Token>,
    constructors: Vec<Constructor>,
}

impl BindingBuilder {
    /// Untyped binding; constructors are added with [`with_constructor`](Self::with_constructor)
    pub fn new(dependency: TypeDescriptor, implementation: TypeDescriptor) -> Self {
        Self {
            dependency,
            implementation,
            lifetime: Lifetime::default(),
            name: None,
            constructors: Vec::new(),
        }
    }

    /// Binding of `I` to the injectable `T`
    pub fn typed<I, T>() -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Implements<I>,
    {
        let constructors = T::constructors()
            .into_iter()
            .map(ConstructorSpec::erase::<I>)
            .collect();
        Self {
            constructors,
            ..Self::new(TypeDescriptor::of::<I>(), TypeDescriptor::of::<T>())
        }
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Shortcut for `with_lifetime(Lifetime::Singleton)`
    pub fn singleton(self) -> Self {
        self.with_lifetime(Lifetime::Singleton)
    }

    /// Set the implementation name
    pub fn named(mut self, name: impl Into<Token>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Add an untyped constructor from its parameters and factory
    pub fn with_factory<F>(self, parameters: Vec<Parameter>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<ServiceHandle> + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(parameters, factory))
    }

    pub fn dependency(&self) -> &TypeDescriptor {
        &self.dependency
    }

    pub fn implementation(&self) -> &TypeDescriptor {
        &self.implementation
    }

    fn invalid(&self, reason: impl Into<String>) -> ContainerError {
        ContainerError::InvalidBinding {
            dependency: self.dependency.clone(),
            implementation: self.implementation.clone(),
            reason: reason.into(),
        }
    }

    /// Check the shape of the binding on its own
    fn check_shape(&self) -> Result<()> {
        let open = self.dependency.is_open();
        if open != self.implementation.is_open() {
            return Err(self.invalid(if open {
                "an open generic dependency needs an open generic implementation"
            } else {
                "an open generic implementation can only be bound to an open generic dependency"
            }));
        }
        if self.dependency.contains_parameter() || self.implementation.contains_parameter() {
            return Err(self.invalid("the type parameter cannot be bound directly"));
        }
        if self.constructors.is_empty() {
            return Err(ContainerError::NoSuitableConstructor {
                implementation: self.implementation.clone(),
            });
        }
        if !open {
            let parameterized = self
                .constructors
                .iter()
                .flat_map(Constructor::parameters)
                .find(|parameter| parameter.ty().contains_parameter());
            if let Some(parameter) = parameterized {
                return Err(self.invalid(format!(
                    "constructor parameter {} refers to the type parameter of a closed binding",
                    parameter.ty()
                )));
            }
        }
        Ok(())
    }

    /// Check the binding against what is already registered for its dependency
    fn check_conflicts(&self, existing: &[Binding]) -> Result<()> {
        for binding in existing {
            if binding.implementation() == &self.implementation {
                return Err(ContainerError::ImplementationAlreadyRegistered {
                    dependency: self.dependency.clone(),
                    implementation: self.implementation.clone(),
                });
            }
            if let (Some(name), Some(other)) = (&self.name, binding.name()) {
                if name == other {
                    return Err(ContainerError::NameAlreadyRegistered {
                        dependency: self.dependency.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn build(self, ordinal: usize) -> Result<Binding> {
        let constructor = select_constructor(&self.constructors)
            .cloned()
            .ok_or_else(|| ContainerError::NoSuitableConstructor {
                implementation: self.implementation.clone(),
            })?;
        Ok(Binding {
            dependency: self.dependency,
            implementation: self.implementation,
            lifetime: self.lifetime,
            name: self.name,
            constructor,
            type_argument: None,
            ordinal,
        })
    }
}

/// Registration API producing a [`Registry`]
///
/// ```rust
/// use injector::container::{ConstructorSpec, DependenciesConfiguration, Injectable, Lifetime};
/// use injector::implements;
///
/// trait Clock: Send + Sync {}
///
/// struct SystemClock;
/// impl Clock for SystemClock {}
/// impl Injectable for SystemClock {
///     fn constructors() -> Vec<ConstructorSpec<Self>> {
///         vec![ConstructorSpec::nullary(|| SystemClock)]
///     }
/// }
/// implements!(SystemClock => dyn Clock);
///
/// let mut configuration = DependenciesConfiguration::new();
/// configuration
///     .register_with_lifetime::<dyn Clock, SystemClock>(Lifetime::Singleton)
///     .unwrap();
/// assert_eq!(configuration.registry().binding_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DependenciesConfiguration {
    registry: Registry,
    next_ordinal: usize,
}

impl DependenciesConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `I` to `T` with a transient lifetime
    pub fn register<I, T>(&mut self) -> Result<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Implements<I>,
    {
        self.register_binding(BindingBuilder::typed::<I, T>())
    }

    pub fn register_with_lifetime<I, T>(&mut self, lifetime: Lifetime) -> Result<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Implements<I>,
    {
        self.register_binding(BindingBuilder::typed::<I, T>().with_lifetime(lifetime))
    }

    pub fn register_named<I, T>(&mut self, name: impl Into<Token>) -> Result<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Implements<I>,
    {
        self.register_binding(BindingBuilder::typed::<I, T>().named(name))
    }

    pub fn register_named_with_lifetime<I, T>(
        &mut self,
        lifetime: Lifetime,
        name: impl Into<Token>,
    ) -> Result<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Implements<I>,
    {
        self.register_binding(
            BindingBuilder::typed::<I, T>()
                .with_lifetime(lifetime)
                .named(name),
        )
    }

    /// Validate and append a binding.
    ///
    /// On error the configuration is left unchanged.
    pub fn register_binding(&mut self, builder: BindingBuilder) -> Result<&mut Self> {
        builder.check_shape()?;
        builder.check_conflicts(self.registry.bindings_for(builder.dependency()))?;

        let binding = builder.build(self.next_ordinal)?;
        tracing::debug!(
            dependency = %binding.dependency(),
            implementation = %binding.implementation(),
            lifetime = %binding.lifetime(),
            name = ?binding.name(),
            "Registered binding"
        );
        self.registry.insert(binding);
        self.next_ordinal += 1;
        Ok(self)
    }

    /// Bindings registered so far
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}
