use std::any::TypeId;
use std::fmt;

/// Marker trait naming a single-parameter generic definition.
///
/// Rust has no runtime generic instantiation, so a generic dependency such as
/// `Service<T>` is described by a zero-sized marker type implementing this
/// trait. The marker is then closed over a concrete argument with
/// [`TypeDescriptor::generic`].
///
/// ```rust
/// use injector::container::{GenericFamily, TypeDescriptor};
///
/// struct ServiceFamily;
/// impl GenericFamily for ServiceFamily {
///     const NAME: &'static str = "Service";
/// }
///
/// let closed = TypeDescriptor::generic::<ServiceFamily>(TypeDescriptor::of::<String>());
/// assert_eq!(closed.to_string(), "Service<alloc::string::String>");
/// ```
pub trait GenericFamily: 'static {
    /// Name used when rendering the definition
    const NAME: &'static str;
}

/// Identity of a generic definition (`G<>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericDefinition {
    type_id: TypeId,
    name: &'static str,
}

impl GenericDefinition {
    /// Definition declared by a marker type
    pub fn of<F: GenericFamily>() -> Self {
        Self {
            type_id: TypeId::of::<F>(),
            name: F::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// Runtime description of a dependency or implementation type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Any `'static` Rust type, trait objects included
    Concrete {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// A generic definition closed over one argument (`G<A>`)
    Generic {
        definition: GenericDefinition,
        argument: Box<TypeDescriptor>,
    },
    /// An unbound generic definition (`G<>`)
    Definition(GenericDefinition),
    /// A request for every implementation of the element type
    Sequence(Box<TypeDescriptor>),
    /// The type parameter of an open definition
    Parameter,
}

impl TypeDescriptor {
    /// Describe a Rust type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Concrete {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Close a generic definition over an argument
    pub fn generic<F: GenericFamily>(argument: TypeDescriptor) -> Self {
        Self::closed(GenericDefinition::of::<F>(), argument)
    }

    /// Close an already known definition over an argument
    pub fn closed(definition: GenericDefinition, argument: TypeDescriptor) -> Self {
        Self::Generic {
            definition,
            argument: Box::new(argument),
        }
    }

    /// The unbound definition of a generic family
    pub fn definition<F: GenericFamily>() -> Self {
        Self::Definition(GenericDefinition::of::<F>())
    }

    /// Sequence of every implementation of `element`
    pub fn sequence_of(element: TypeDescriptor) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Sequence of every implementation of a Rust type
    pub fn sequence<T: ?Sized + 'static>() -> Self {
        Self::sequence_of(Self::of::<T>())
    }

    /// Whether this is an unbound generic definition
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Definition(_))
    }

    /// Whether the type parameter placeholder occurs anywhere in this descriptor
    pub fn contains_parameter(&self) -> bool {
        match self {
            Self::Parameter => true,
            Self::Generic { argument, .. } => argument.contains_parameter(),
            Self::Sequence(element) => element.contains_parameter(),
            Self::Concrete { .. } | Self::Definition(_) => false,
        }
    }

    /// Element type when this is a sequence request
    pub fn sequence_element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Definition and argument when this is a closed generic
    pub fn generic_parts(&self) -> Option<(GenericDefinition, &TypeDescriptor)> {
        match self {
            Self::Generic {
                definition,
                argument,
            } => Some((*definition, argument)),
            _ => None,
        }
    }

    /// Replace the type parameter with `argument`, closing open definitions
    pub fn substitute(&self, argument: &TypeDescriptor) -> TypeDescriptor {
        match self {
            Self::Parameter => argument.clone(),
            Self::Definition(definition) => Self::closed(*definition, argument.clone()),
            Self::Generic {
                definition,
                argument: inner,
            } => Self::closed(*definition, inner.substitute(argument)),
            Self::Sequence(element) => Self::sequence_of(element.substitute(argument)),
            Self::Concrete { .. } => self.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete { type_name, .. } => write!(f, "{}", type_name),
            Self::Generic {
                definition,
                argument,
            } => write!(f, "{}<{}>", definition.name(), argument),
            Self::Definition(definition) => write!(f, "{}<>", definition.name()),
            Self::Sequence(element) => write!(f, "Sequence<{}>", element),
            Self::Parameter => write!(f, "T"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Repository {}

    struct ServiceFamily;
    impl GenericFamily for ServiceFamily {
        const NAME: &'static str = "Service";
    }

    struct ServiceImplFamily;
    impl GenericFamily for ServiceImplFamily {
        const NAME: &'static str = "ServiceImpl";
    }

    #[test]
    fn test_concrete_identity() {
        let a = TypeDescriptor::of::<dyn Repository>();
        let b = TypeDescriptor::of::<dyn Repository>();
        assert_eq!(a, b);
        assert_ne!(a, TypeDescriptor::of::<String>());
        assert_eq!(TypeDescriptor::of::<String>().to_string(), "alloc::string::String");
    }

    #[test]
    fn test_open_definition_substitution() {
        let repository = TypeDescriptor::of::<dyn Repository>();
        let open = TypeDescriptor::definition::<ServiceImplFamily>();
        assert!(open.is_open());

        let closed = open.substitute(&repository);
        assert!(!closed.is_open());
        assert_eq!(
            closed,
            TypeDescriptor::generic::<ServiceImplFamily>(repository.clone())
        );
        let (definition, argument) = closed.generic_parts().unwrap();
        assert_eq!(definition, GenericDefinition::of::<ServiceImplFamily>());
        assert_eq!(argument, &repository);
    }

    #[test]
    fn test_parameter_substitution_is_deep() {
        let template = TypeDescriptor::sequence_of(TypeDescriptor::closed(
            GenericDefinition::of::<ServiceFamily>(),
            TypeDescriptor::Parameter,
        ));
        assert!(template.contains_parameter());

        let closed = template.substitute(&TypeDescriptor::of::<u8>());
        assert!(!closed.contains_parameter());
        assert_eq!(closed.to_string(), "Sequence<Service<u8>>");
    }

    #[test]
    fn test_sequence_element() {
        let sequence = TypeDescriptor::sequence::<dyn Repository>();
        assert_eq!(
            sequence.sequence_element(),
            Some(&TypeDescriptor::of::<dyn Repository>())
        );
        assert!(TypeDescriptor::of::<u8>().sequence_element().is_none());
    }

    #[test]
    fn test_definitions_differ_by_marker() {
        assert_ne!(
            TypeDescriptor::definition::<ServiceFamily>(),
            TypeDescriptor::definition::<ServiceImplFamily>()
        );
        assert_eq!(
            TypeDescriptor::definition::<ServiceFamily>().to_string(),
            "Service<>"
        );
    }
}
