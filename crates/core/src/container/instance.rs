use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::descriptor::TypeDescriptor;

/// Type-erased value produced by a constructor.
///
/// For a dependency `I` the handle holds an `Arc<I>`, so a `dyn Repository`
/// binding stores an `Arc<dyn Repository>` behind the `Any`.
pub type ServiceHandle = Arc<dyn Any + Send + Sync>;

/// Wrap a service in the handle shape [`Instance::get`] expects
pub fn into_handle<I: ?Sized + Send + Sync + 'static>(service: Arc<I>) -> ServiceHandle {
    Arc::new(service)
}

/// A resolved dependency together with the implementation that produced it
#[derive(Clone)]
pub struct Instance {
    implementation: TypeDescriptor,
    value: ServiceHandle,
}

impl Instance {
    pub fn new(implementation: TypeDescriptor, value: ServiceHandle) -> Self {
        Self {
            implementation,
            value,
        }
    }

    /// Instance of a collection request, in registration order
    pub(crate) fn sequence(element: TypeDescriptor, items: Vec<Instance>) -> Self {
        Self {
            implementation: TypeDescriptor::sequence_of(element),
            value: Arc::new(items),
        }
    }

    /// The implementation type that was constructed
    pub fn implementation(&self) -> &TypeDescriptor {
        &self.implementation
    }

    pub fn value(&self) -> &ServiceHandle {
        &self.value
    }

    /// The service as the dependency type it was bound to
    pub fn get<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.value.downcast_ref::<Arc<I>>().cloned()
    }

    /// Items of a collection request
    pub fn as_sequence(&self) -> Option<&[Instance]> {
        self.value.downcast_ref::<Vec<Instance>>().map(Vec::as_slice)
    }

    /// Items of a collection request, each as the dependency type
    pub fn get_all<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Vec<Arc<I>>> {
        self.as_sequence()?.iter().map(Instance::get::<I>).collect()
    }

    /// Whether both instances share the same underlying value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("implementation", &self.implementation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    fn english() -> Instance {
        let service: Arc<dyn Greeter> = Arc::new(English);
        Instance::new(TypeDescriptor::of::<English>(), into_handle(service))
    }

    #[test]
    fn test_get_returns_bound_handle() {
        let instance = english();
        let greeter = instance.get::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert!(instance.get::<English>().is_none());
        assert_eq!(instance.implementation(), &TypeDescriptor::of::<English>());
    }

    #[test]
    fn test_clones_share_identity() {
        let first = english();
        let second = first.clone();
        assert!(first.ptr_eq(&second));
        assert!(!first.ptr_eq(&english()));
    }

    #[test]
    fn test_sequence_access() {
        let items = vec![english(), english()];
        let sequence = Instance::sequence(TypeDescriptor::of::<dyn Greeter>(), items);
        assert_eq!(sequence.as_sequence().unwrap().len(), 2);
        let greeters = sequence.get_all::<dyn Greeter>().unwrap();
        assert_eq!(greeters.len(), 2);
        assert!(sequence.get::<dyn Greeter>().is_none());
        assert_eq!(
            sequence.implementation(),
            &TypeDescriptor::sequence::<dyn Greeter>()
        );
    }
}
