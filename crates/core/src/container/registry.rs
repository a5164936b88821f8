use std::collections::HashMap;

use crate::container::binding::Binding;
use crate::container::descriptor::TypeDescriptor;

/// Validated bindings grouped by dependency type.
///
/// Groups keep the order in which their dependency was first registered and
/// bindings keep insertion order inside a group; that order decides the
/// default binding and the order of collection results.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: Vec<(TypeDescriptor, Vec<Binding>)>,
    index: HashMap<TypeDescriptor, usize>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dependency with its ordered bindings
    pub fn all_bindings(&self) -> impl Iterator<Item = (&TypeDescriptor, &[Binding])> {
        self.groups
            .iter()
            .map(|(dependency, bindings)| (dependency, bindings.as_slice()))
    }

    /// Bindings registered for one dependency, in registration order
    pub fn bindings_for(&self, dependency: &TypeDescriptor) -> &[Binding] {
        self.index
            .get(dependency)
            .map(|&position| self.groups[position].1.as_slice())
            .unwrap_or(&[])
    }

    /// Check if any binding exists for a dependency
    pub fn contains(&self, dependency: &TypeDescriptor) -> bool {
        self.index.contains_key(dependency)
    }

    /// Number of distinct dependency types
    pub fn dependency_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of bindings across all dependencies
    pub fn binding_count(&self) -> usize {
        self.groups.iter().map(|(_, bindings)| bindings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume the registry, yielding bindings group by group
    pub(crate) fn into_bindings(self) -> impl Iterator<Item = Binding> {
        self.groups.into_iter().flat_map(|(_, bindings)| bindings)
    }

    pub(crate) fn insert(&mut self, binding: Binding) {
        match self.index.get(binding.dependency()) {
            Some(&position) => self.groups[position].1.push(binding),
            None => {
                self.index
                    .insert(binding.dependency().clone(), self.groups.len());
                self.groups.push((binding.dependency().clone(), vec![binding]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::autowiring::{Constructor, Parameter};
    use crate::container::binding::BindingBuilder;
    use crate::container::instance::into_handle;
    use crate::container::DependenciesConfiguration;
    use std::sync::Arc;

    trait Repository {}
    struct First;
    struct Second;
    trait Logger {}
    struct Console;

    fn builder(dependency: TypeDescriptor, implementation: TypeDescriptor) -> BindingBuilder {
        BindingBuilder::new(dependency, implementation).with_constructor(Constructor::new(
            Vec::<Parameter>::new(),
            |_| Ok(into_handle(Arc::new(()))),
        ))
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut configuration = DependenciesConfiguration::new();
        configuration
            .register_binding(builder(
                TypeDescriptor::of::<dyn Repository>(),
                TypeDescriptor::of::<First>(),
            ))
            .unwrap()
            .register_binding(builder(
                TypeDescriptor::of::<dyn Logger>(),
                TypeDescriptor::of::<Console>(),
            ))
            .unwrap()
            .register_binding(builder(
                TypeDescriptor::of::<dyn Repository>(),
                TypeDescriptor::of::<Second>(),
            ))
            .unwrap();
        let registry = configuration.into_registry();

        assert_eq!(registry.dependency_count(), 2);
        assert_eq!(registry.binding_count(), 3);

        let dependencies: Vec<_> = registry.all_bindings().map(|(d, _)| d.clone()).collect();
        assert_eq!(
            dependencies,
            vec![
                TypeDescriptor::of::<dyn Repository>(),
                TypeDescriptor::of::<dyn Logger>()
            ]
        );

        let implementations: Vec<_> = registry
            .bindings_for(&TypeDescriptor::of::<dyn Repository>())
            .iter()
            .map(|binding| binding.implementation().clone())
            .collect();
        assert_eq!(
            implementations,
            vec![TypeDescriptor::of::<First>(), TypeDescriptor::of::<Second>()]
        );
    }

    #[test]
    fn test_unknown_dependency_has_no_bindings() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(&TypeDescriptor::of::<dyn Repository>()));
        assert!(registry
            .bindings_for(&TypeDescriptor::of::<dyn Repository>())
            .is_empty());
    }
}
