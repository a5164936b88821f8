//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use injector::implements;
use injector::{
    into_handle, BindingBuilder, ConstructorSpec, GenericFamily, Injectable, Instance, Parameter,
    TypeDescriptor,
};

/// Test repository trait
pub trait Repository: Send + Sync {
    fn label(&self) -> &'static str;
}

/// Default repository implementation
pub struct Repository1 {
    pub id: usize,
}

impl Repository for Repository1 {
    fn label(&self) -> &'static str {
        "repository1"
    }
}

impl Injectable for Repository1 {
    fn constructors() -> Vec<ConstructorSpec<Self>> {
        vec![ConstructorSpec::nullary(|| Repository1 { id: next_id() })]
    }
}

implements!(Repository1 => dyn Repository);

/// Second repository implementation
pub struct Repository2 {
    pub id: usize,
}

impl Repository for Repository2 {
    fn label(&self) -> &'static str {
        "repository2"
    }
}

impl Injectable for Repository2 {
    fn constructors() -> Vec<ConstructorSpec<Self>> {
        vec![ConstructorSpec::nullary(|| Repository2 { id: next_id() })]
    }
}

implements!(Repository2 => dyn Repository);

pub trait Consumer: Send + Sync {
    fn repositories(&self) -> Vec<Arc<dyn Repository>>;
}

/// Takes the repository registered as "Second"
pub struct NamedConsumer {
    pub repository: Arc<dyn Repository>,
}

impl Consumer for NamedConsumer {
    fn repositories(&self) -> Vec<Arc<dyn Repository>> {
        vec![Arc::clone(&self.repository)]
    }
}

impl Injectable for NamedConsumer {
    fn constructors() -> Vec<ConstructorSpec<Self>> {
        vec![ConstructorSpec::new(
            vec![Parameter::of::<dyn Repository>().named("Second")],
            |arguments| {
                Ok(NamedConsumer {
                    repository: arguments.next()?,
                })
            },
        )]
    }
}

implements!(NamedConsumer => dyn Consumer);

/// Takes every repository
pub struct CollectionConsumer {
    pub repositories: Vec<Arc<dyn Repository>>,
}

impl Consumer for CollectionConsumer {
    fn repositories(&self) -> Vec<Arc<dyn Repository>> {
        self.repositories.clone()
    }
}

impl Injectable for CollectionConsumer {
    fn constructors() -> Vec<ConstructorSpec<Self>> {
        vec![ConstructorSpec::new(
            vec![Parameter::sequence::<dyn Repository>()],
            |arguments| {
                Ok(CollectionConsumer {
                    repositories: arguments.next_all()?,
                })
            },
        )]
    }
}

implements!(CollectionConsumer => dyn Consumer);

/// Generic service over a repository type
pub trait Service: Send + Sync {
    fn repository(&self) -> &Instance;
    fn type_argument(&self) -> Option<&TypeDescriptor>;
}

pub struct ServiceFamily;

impl GenericFamily for ServiceFamily {
    const NAME: &'static str = "Service";
}

pub struct ServiceImplFamily;

impl GenericFamily for ServiceImplFamily {
    const NAME: &'static str = "ServiceImpl";
}

pub struct CachedServiceImplFamily;

impl GenericFamily for CachedServiceImplFamily {
    const NAME: &'static str = "CachedServiceImpl";
}

pub struct ServiceImpl {
    pub repository: Instance,
    pub argument: Option<TypeDescriptor>,
}

impl Service for ServiceImpl {
    fn repository(&self) -> &Instance {
        &self.repository
    }

    fn type_argument(&self) -> Option<&TypeDescriptor> {
        self.argument.as_ref()
    }
}

/// `Service<T>` for a concrete argument
pub fn service_of(argument: TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::generic::<ServiceFamily>(argument)
}

/// `Service<> -> ServiceImpl<>`, constructed from a `T`
pub fn open_service_binding() -> BindingBuilder {
    open_binding_to(TypeDescriptor::definition::<ServiceImplFamily>())
}

/// `Service<>` bound to another open implementation
pub fn open_binding_to(implementation: TypeDescriptor) -> BindingBuilder {
    BindingBuilder::new(TypeDescriptor::definition::<ServiceFamily>(), implementation).with_factory(
        vec![Parameter::type_parameter()],
        |mut arguments| {
            let argument = arguments.type_argument().cloned();
            let repository = arguments.next_instance()?;
            let service: Arc<dyn Service> = Arc::new(ServiceImpl {
                repository,
                argument,
            });
            Ok(into_handle(service))
        },
    )
}

/// Untyped binding of `dyn Repository` that counts constructions
pub fn counting_repository(counter: Arc<AtomicUsize>) -> BindingBuilder {
    BindingBuilder::new(
        TypeDescriptor::of::<dyn Repository>(),
        TypeDescriptor::of::<Repository1>(),
    )
    .with_factory(Vec::new(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        let repository: Arc<dyn Repository> = Arc::new(Repository1 { id: next_id() });
        Ok(into_handle(repository))
    })
}

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn next_id() -> usize {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
