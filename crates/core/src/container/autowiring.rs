use std::fmt;
use std::sync::Arc;

use crate::container::descriptor::TypeDescriptor;
use crate::container::instance::{into_handle, Instance, ServiceHandle};
use crate::container::tokens::Token;
use crate::errors::{ContainerError, Result};

/// A constructor parameter: the dependency it needs and, optionally, the
/// name of the binding that must satisfy it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    ty: TypeDescriptor,
    name: Option<Token>,
}

impl Parameter {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self { ty, name: None }
    }

    /// Parameter resolved as a single instance of `I`
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::of::<I>())
    }

    /// Parameter receiving every implementation of `I`
    pub fn sequence<I: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::sequence::<I>())
    }

    /// Parameter typed by the open definition's type argument
    pub fn type_parameter() -> Self {
        Self::new(TypeDescriptor::Parameter)
    }

    /// Require the binding registered under `name`
    pub fn named(mut self, name: impl Into<Token>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn name(&self) -> Option<&Token> {
        self.name.as_ref()
    }

    fn substitute(&self, argument: &TypeDescriptor) -> Self {
        Self {
            ty: self.ty.substitute(argument),
            name: self.name.clone(),
        }
    }
}

/// Factory invoked with the resolved constructor arguments
pub type Factory = Arc<dyn Fn(Arguments) -> Result<ServiceHandle> + Send + Sync>;

/// Ordered parameter list plus the factory that consumes it
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<Parameter>,
    factory: Factory,
}

impl Constructor {
    pub fn new<F>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<ServiceHandle> + Send + Sync + 'static,
    {
        Self {
            parameters,
            factory: Arc::new(factory),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, arguments: Arguments) -> Result<ServiceHandle> {
        (self.factory)(arguments)
    }

    /// Same factory with the type parameter replaced in every parameter
    pub(crate) fn specialize(&self, argument: &TypeDescriptor) -> Self {
        Self {
            parameters: self
                .parameters
                .iter()
                .map(|parameter| parameter.substitute(argument))
                .collect(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .field("factory", &"<factory_fn>")
            .finish()
    }
}

/// Pick the constructor with the fewest parameters; the first declared wins ties
pub(crate) fn select_constructor(constructors: &[Constructor]) -> Option<&Constructor> {
    constructors
        .iter()
        .min_by_key(|constructor| constructor.parameters().len())
}

/// Resolved arguments handed to a factory in parameter order
pub struct Arguments {
    implementation: TypeDescriptor,
    type_argument: Option<TypeDescriptor>,
    values: std::vec::IntoIter<Instance>,
}

impl Arguments {
    pub(crate) fn new(
        implementation: TypeDescriptor,
        type_argument: Option<TypeDescriptor>,
        values: Vec<Instance>,
    ) -> Self {
        Self {
            implementation,
            type_argument,
            values: values.into_iter(),
        }
    }

    /// The implementation being constructed
    pub fn implementation(&self) -> &TypeDescriptor {
        &self.implementation
    }

    /// The argument an open definition was specialized with
    pub fn type_argument(&self) -> Option<&TypeDescriptor> {
        self.type_argument.as_ref()
    }

    /// Number of arguments not yet taken
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Take the next argument without interpreting it
    pub fn next_instance(&mut self) -> Result<Instance> {
        self.values
            .next()
            .ok_or_else(|| ContainerError::ArgumentsExhausted {
                implementation: self.implementation.clone(),
            })
    }

    /// Take the next argument as dependency type `I`
    pub fn next<I: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<I>> {
        let instance = self.next_instance()?;
        instance.get::<I>().ok_or_else(|| mismatch::<I>(&instance))
    }

    /// Take the next argument as the collection of every `I`
    pub fn next_all<I: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Vec<Arc<I>>> {
        let instance = self.next_instance()?;
        instance.get_all::<I>().ok_or_else(|| mismatch::<I>(&instance))
    }
}

pub(crate) fn mismatch<I: ?Sized>(instance: &Instance) -> ContainerError {
    ContainerError::TypeMismatch {
        expected: std::any::type_name::<I>().to_string(),
        actual: instance.implementation().to_string(),
    }
}

/// Coercion from an implementation to the dependency it is bound to.
///
/// Every type implements `Implements<Self>`; trait bindings are declared with
/// [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    fn into_service(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn into_service(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declare that an implementation can be bound to one or more trait objects
///
/// ```rust
/// use injector::implements;
///
/// trait Repository: Send + Sync {}
/// struct SqlRepository;
/// impl Repository for SqlRepository {}
///
/// implements!(SqlRepository => dyn Repository);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::container::Implements<$service> for $implementation {
                fn into_service(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

/// Typed constructor of an [`Injectable`] implementation
pub struct ConstructorSpec<T> {
    parameters: Vec<Parameter>,
    build: Arc<dyn Fn(&mut Arguments) -> Result<T> + Send + Sync>,
}

impl<T: Send + Sync + 'static> ConstructorSpec<T> {
    pub fn new<F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            parameters,
            build: Arc::new(build),
        }
    }

    /// Constructor without parameters
    pub fn nullary<F>(build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Vec::new(), move |_| Ok(build()))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Erase into a [`Constructor`] producing the `I` handle
    pub(crate) fn erase<I>(self) -> Constructor
    where
        I: ?Sized + Send + Sync + 'static,
        T: Implements<I>,
    {
        let build = self.build;
        Constructor::new(self.parameters, move |mut arguments| {
            let value = build(&mut arguments)?;
            let service = <T as Implements<I>>::into_service(Arc::new(value));
            Ok(into_handle(service))
        })
    }
}

impl<T: Default + Send + Sync + 'static> ConstructorSpec<T> {
    /// Constructor backed by `Default`
    pub fn from_default() -> Self {
        Self::nullary(T::default)
    }
}

/// Implementation type whose constructors the resolver can call
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Every constructor of the type, in declaration order
    fn constructors() -> Vec<ConstructorSpec<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Repository: Send + Sync {
        fn label(&self) -> &'static str;
    }

    #[derive(Default)]
    struct MemoryRepository;
    impl Repository for MemoryRepository {
        fn label(&self) -> &'static str {
            "memory"
        }
    }
    implements!(MemoryRepository => dyn Repository);

    fn nothing() -> Result<ServiceHandle> {
        Ok(into_handle(Arc::new(())))
    }

    #[test]
    fn test_fewest_parameters_wins() {
        let constructors = vec![
            Constructor::new(vec![Parameter::of::<u8>(), Parameter::of::<u16>()], |_| nothing()),
            Constructor::new(vec![Parameter::of::<u32>()], |_| nothing()),
            Constructor::new(vec![Parameter::of::<u64>()], |_| nothing()),
        ];
        let selected = select_constructor(&constructors).unwrap();
        assert_eq!(selected.parameters(), &[Parameter::of::<u32>()]);
        assert!(select_constructor(&[]).is_none());
    }

    #[test]
    fn test_specialize_replaces_type_parameter() {
        let constructor = Constructor::new(
            vec![Parameter::type_parameter().named("Second"), Parameter::of::<u8>()],
            |_| nothing(),
        );
        let specialized = constructor.specialize(&TypeDescriptor::of::<String>());
        assert_eq!(
            specialized.parameters(),
            &[
                Parameter::of::<String>().named("Second"),
                Parameter::of::<u8>()
            ]
        );
    }

    #[test]
    fn test_arguments_are_taken_in_order() {
        let repository: Arc<dyn Repository> = Arc::new(MemoryRepository);
        let values = vec![
            Instance::new(TypeDescriptor::of::<MemoryRepository>(), into_handle(repository)),
            Instance::new(TypeDescriptor::of::<u8>(), into_handle(Arc::new(7u8))),
        ];
        let mut arguments = Arguments::new(TypeDescriptor::of::<()>(), None, values);
        assert_eq!(arguments.remaining(), 2);
        assert_eq!(arguments.next::<dyn Repository>().unwrap().label(), "memory");
        assert_eq!(*arguments.next::<u8>().unwrap(), 7);
        assert!(matches!(
            arguments.next_instance(),
            Err(ContainerError::ArgumentsExhausted { .. })
        ));
    }

    #[test]
    fn test_argument_type_mismatch() {
        let values = vec![Instance::new(
            TypeDescriptor::of::<u8>(),
            into_handle(Arc::new(7u8)),
        )];
        let mut arguments = Arguments::new(TypeDescriptor::of::<()>(), None, values);
        match arguments.next::<dyn Repository>() {
            Err(ContainerError::TypeMismatch { actual, .. }) => assert_eq!(actual, "u8"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_erased_spec_produces_service_handle() {
        let constructor = ConstructorSpec::<MemoryRepository>::from_default().erase::<dyn Repository>();
        let handle = constructor
            .invoke(Arguments::new(TypeDescriptor::of::<MemoryRepository>(), None, Vec::new()))
            .unwrap();
        let instance = Instance::new(TypeDescriptor::of::<MemoryRepository>(), handle);
        assert_eq!(instance.get::<dyn Repository>().unwrap().label(), "memory");
    }
}
