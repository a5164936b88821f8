use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde::Serialize;

use crate::config::ResolverConfig;
use crate::container::autowiring::mismatch;
use crate::container::binding::Binding;
use crate::container::descriptor::{GenericDefinition, TypeDescriptor};
use crate::container::instance::Instance;
use crate::container::provider::ProviderEntry;
use crate::container::registry::Registry;
use crate::container::tokens::Token;
use crate::errors::{ContainerError, Result};

/// Implementations currently under construction, outermost first
#[derive(Debug, Clone)]
pub struct ResolutionPath {
    frames: Vec<(TypeDescriptor, TypeDescriptor)>,
    max_depth: usize,
}

impl ResolutionPath {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Number of nested constructions
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if a binding is already being constructed on this path
    pub fn contains(&self, dependency: &TypeDescriptor, implementation: &TypeDescriptor) -> bool {
        self.frames
            .iter()
            .any(|(d, i)| d == dependency && i == implementation)
    }

    /// Get the path as a string for error messages
    pub fn path_string(&self) -> String {
        self.frames
            .iter()
            .map(|(_, implementation)| implementation.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub(crate) fn enter(
        &mut self,
        dependency: &TypeDescriptor,
        implementation: &TypeDescriptor,
    ) -> Result<()> {
        if self.contains(dependency, implementation) {
            let path = self.path_with(implementation);
            tracing::warn!(path = %path, "Circular dependency detected");
            return Err(ContainerError::CircularDependency { path });
        }
        if self.frames.len() >= self.max_depth {
            let path = self.path_with(implementation);
            tracing::warn!(depth = self.max_depth, path = %path, "Resolution depth exceeded");
            return Err(ContainerError::ResolutionDepthExceeded {
                depth: self.max_depth,
                path,
            });
        }
        self.frames
            .push((dependency.clone(), implementation.clone()));
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.frames.pop();
    }

    fn path_with(&self, implementation: &TypeDescriptor) -> String {
        if self.frames.is_empty() {
            return implementation.to_string();
        }
        format!("{} -> {}", self.path_string(), implementation)
    }
}

/// Read-only counters describing a resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStatistics {
    /// Dependency types with at least one provider
    pub dependencies: usize,
    /// Providers built from closed bindings
    pub closed_entries: usize,
    /// Providers built by specializing open bindings
    pub specialized_entries: usize,
    /// Open bindings available for specialization
    pub open_bindings: usize,
    pub singleton_entries: usize,
    pub transient_entries: usize,
}

/// Which open bindings a cache miss should specialize
#[derive(Clone, Copy)]
enum Specialization<'a> {
    Default,
    Named(&'a Token),
}

type EntryList = Arc<[Arc<ProviderEntry>]>;

#[derive(Debug, Default)]
struct ProviderTable {
    entries: HashMap<TypeDescriptor, EntryList>,
    order: Vec<TypeDescriptor>,
}

impl ProviderTable {
    fn get(&self, dependency: &TypeDescriptor) -> Option<EntryList> {
        self.entries.get(dependency).cloned()
    }

    fn replace(&mut self, dependency: &TypeDescriptor, entries: Vec<Arc<ProviderEntry>>) {
        if !self.entries.contains_key(dependency) {
            self.order.push(dependency.clone());
        }
        self.entries.insert(dependency.clone(), entries.into());
    }
}

/// Resolves dependencies from a [`Registry`].
///
/// Closed bindings get their providers when the resolver is built. Open
/// generic bindings are kept aside and specialized the first time a matching
/// closed type is requested; the specialized provider is cached so every
/// later request reuses it.
#[derive(Debug)]
pub struct Resolver {
    table: RwLock<ProviderTable>,
    open: HashMap<GenericDefinition, Vec<Binding>>,
    config: ResolverConfig,
}

impl Resolver {
    /// Build a resolver with the default configuration
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    pub fn with_config(registry: Registry, config: ResolverConfig) -> Self {
        let mut grouped: HashMap<TypeDescriptor, Vec<Arc<ProviderEntry>>> = HashMap::new();
        let mut order = Vec::new();
        let mut open: HashMap<GenericDefinition, Vec<Binding>> = HashMap::new();

        for binding in registry.into_bindings() {
            if let TypeDescriptor::Definition(definition) = binding.dependency() {
                open.entry(*definition).or_default().push(binding);
                continue;
            }
            let dependency = binding.dependency().clone();
            if !grouped.contains_key(&dependency) {
                order.push(dependency.clone());
            }
            grouped
                .entry(dependency)
                .or_default()
                .push(Arc::new(ProviderEntry::new(binding, false)));
        }

        let table = ProviderTable {
            entries: grouped
                .into_iter()
                .map(|(dependency, entries)| (dependency, entries.into()))
                .collect(),
            order,
        };

        tracing::debug!(
            dependencies = table.order.len(),
            open_bindings = open.values().map(Vec::len).sum::<usize>(),
            max_depth = config.max_depth,
            "Resolver built"
        );

        let resolver = Self {
            table: RwLock::new(table),
            open,
            config,
        };

        if resolver.config.validate_on_build {
            if let Err(problems) = resolver.validate() {
                for problem in &problems {
                    tracing::warn!(error = %problem, "Unresolvable constructor parameter");
                }
            }
        }

        resolver
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one instance of `dependency`, optionally by implementation name
    pub fn resolve(&self, dependency: &TypeDescriptor, name: Option<&Token>) -> Result<Instance> {
        let mut path = ResolutionPath::new(self.config.max_depth);
        self.resolve_within(dependency, name, &mut path)
    }

    /// Resolve every implementation of `element`, in registration order
    pub fn resolve_all(&self, element: &TypeDescriptor) -> Result<Instance> {
        let mut path = ResolutionPath::new(self.config.max_depth);
        self.resolve_all_within(element, &mut path)
    }

    /// Resolve `I` with the default binding
    pub fn get<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>> {
        self.get_as::<I>(&TypeDescriptor::of::<I>(), None)
    }

    /// Resolve the binding of `I` registered under `name`
    pub fn get_named<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: impl Into<Token>,
    ) -> Result<Arc<I>> {
        let name = name.into();
        self.get_as::<I>(&TypeDescriptor::of::<I>(), Some(&name))
    }

    /// Resolve every implementation of `I`
    pub fn get_all<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>> {
        let instance = self.resolve(&TypeDescriptor::sequence::<I>(), None)?;
        instance.get_all::<I>().ok_or_else(|| mismatch::<I>(&instance))
    }

    /// Resolve `I`, returning `None` on any failure
    pub fn try_get<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.get::<I>().ok()
    }

    /// Resolve an arbitrary descriptor and view the result as `S`.
    ///
    /// Used for generic instantiations, whose descriptors have no Rust type of
    /// their own.
    pub fn get_as<S: ?Sized + Send + Sync + 'static>(
        &self,
        dependency: &TypeDescriptor,
        name: Option<&Token>,
    ) -> Result<Arc<S>> {
        let instance = self.resolve(dependency, name)?;
        instance.get::<S>().ok_or_else(|| mismatch::<S>(&instance))
    }

    /// Check if `dependency` has a provider or a matching open binding
    pub fn contains(&self, dependency: &TypeDescriptor) -> Result<bool> {
        let cached = self.read_table()?.entries.contains_key(dependency);
        Ok(cached || self.open_candidates(dependency).is_some())
    }

    /// Dependencies with providers in first-registration order, then open definitions
    pub fn registered_dependencies(&self) -> Result<Vec<TypeDescriptor>> {
        let table = self.read_table()?;
        let mut dependencies = table.order.clone();
        let mut open: Vec<&Binding> = self.open.values().filter_map(|b| b.first()).collect();
        open.sort_by_key(|binding| binding.ordinal());
        dependencies.extend(open.into_iter().map(|binding| binding.dependency().clone()));
        Ok(dependencies)
    }

    pub fn statistics(&self) -> Result<ResolverStatistics> {
        let table = self.read_table()?;
        let mut statistics = ResolverStatistics {
            dependencies: table.entries.len(),
            open_bindings: self.open.values().map(Vec::len).sum(),
            ..ResolverStatistics::default()
        };
        for entry in table.entries.values().flat_map(|entries| entries.iter()) {
            if entry.is_specialized() {
                statistics.specialized_entries += 1;
            } else {
                statistics.closed_entries += 1;
            }
            if entry.lifetime().is_singleton() {
                statistics.singleton_entries += 1;
            } else {
                statistics.transient_entries += 1;
            }
        }
        Ok(statistics)
    }

    /// Check that every constructor parameter of every provider can be satisfied.
    ///
    /// Nothing is constructed; open bindings are checked once specialized.
    pub fn validate(&self) -> std::result::Result<(), Vec<ContainerError>> {
        let table = self.read_table().map_err(|error| vec![error])?;
        let mut problems = Vec::new();

        for dependency in &table.order {
            let Some(entries) = table.entries.get(dependency) else {
                continue;
            };
            for entry in entries.iter() {
                for parameter in entry.binding().constructor().parameters() {
                    if !self.is_satisfiable(&table, parameter.ty(), parameter.name()) {
                        problems.push(ContainerError::not_registered(
                            parameter.ty().clone(),
                            parameter.name().cloned(),
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    pub(crate) fn resolve_within(
        &self,
        dependency: &TypeDescriptor,
        name: Option<&Token>,
        path: &mut ResolutionPath,
    ) -> Result<Instance> {
        tracing::trace!(
            dependency = %dependency,
            name = ?name,
            depth = path.depth(),
            "Resolving dependency"
        );

        if let Some(element) = dependency.sequence_element() {
            if self.entries(dependency)?.is_none() {
                return self.resolve_all_within(element, path);
            }
        }

        match self.find_entry(dependency, name)? {
            Some(entry) => entry.provide(self, path),
            None => Err(ContainerError::not_registered(
                dependency.clone(),
                name.cloned(),
            )),
        }
    }

    fn resolve_all_within(
        &self,
        element: &TypeDescriptor,
        path: &mut ResolutionPath,
    ) -> Result<Instance> {
        if self.entries(element)?.is_none() {
            self.specialize(element, Specialization::Default)?;
        }
        let items = match self.entries(element)? {
            Some(entries) => entries
                .iter()
                .map(|entry| entry.provide(self, path))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(Instance::sequence(element.clone(), items))
    }

    fn read_table(&self) -> Result<RwLockReadGuard<'_, ProviderTable>> {
        self.table
            .read()
            .map_err(|_| ContainerError::lock_error("provider table"))
    }

    fn entries(&self, dependency: &TypeDescriptor) -> Result<Option<EntryList>> {
        Ok(self.read_table()?.get(dependency))
    }

    fn lookup(
        &self,
        dependency: &TypeDescriptor,
        name: Option<&Token>,
    ) -> Result<Option<Arc<ProviderEntry>>> {
        Ok(self.entries(dependency)?.and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.binding().matches_name(name))
                .cloned()
        }))
    }

    fn find_entry(
        &self,
        dependency: &TypeDescriptor,
        name: Option<&Token>,
    ) -> Result<Option<Arc<ProviderEntry>>> {
        if let Some(entry) = self.lookup(dependency, name)? {
            return Ok(Some(entry));
        }
        if dependency.generic_parts().is_none() {
            return Ok(None);
        }
        let selection = name.map_or(Specialization::Default, Specialization::Named);
        self.specialize(dependency, selection)?;
        self.lookup(dependency, name)
    }

    fn open_candidates(&self, dependency: &TypeDescriptor) -> Option<&[Binding]> {
        let (definition, _) = dependency.generic_parts()?;
        self.open
            .get(&definition)
            .map(Vec::as_slice)
            .filter(|bindings| !bindings.is_empty())
    }

    /// Install providers for open bindings matching the closed generic `dependency`.
    ///
    /// Only a miss specializes: an unnamed request when `dependency` has no
    /// entries, a named request when no entry carries the name. New entries
    /// are appended, so an entry already in the table never changes position
    /// and the unnamed default stays fixed once chosen. The check and the
    /// insert happen under one write lock.
    fn specialize(&self, dependency: &TypeDescriptor, selection: Specialization<'_>) -> Result<()> {
        let Some((_, argument)) = dependency.generic_parts() else {
            return Ok(());
        };
        let Some(open) = self.open_candidates(dependency) else {
            return Ok(());
        };

        let mut table = self
            .table
            .write()
            .map_err(|_| ContainerError::lock_error("provider table"))?;
        let mut merged: Vec<Arc<ProviderEntry>> = table
            .get(dependency)
            .map(|entries| entries.to_vec())
            .unwrap_or_default();

        let mut candidates: Vec<&Binding> = match selection {
            Specialization::Default if merged.is_empty() => vec![&open[0]],
            Specialization::Default => return Ok(()),
            Specialization::Named(name) => {
                if merged.iter().any(|entry| entry.binding().matches_name(Some(name))) {
                    return Ok(());
                }
                let Some(named) = open.iter().find(|b| b.name() == Some(name)) else {
                    return Ok(());
                };
                if merged.is_empty() {
                    // The default goes first so later unnamed requests see it
                    vec![&open[0], named]
                } else {
                    vec![named]
                }
            }
        };
        candidates.dedup_by_key(|binding| binding.ordinal());

        let before = merged.len();
        for binding in candidates {
            let closed = binding.specialize(argument);
            let conflict = merged.iter().any(|entry| {
                entry.implementation() == closed.implementation()
                    || (closed.name().is_some() && entry.name() == closed.name())
            });
            if conflict {
                tracing::debug!(
                    dependency = %dependency,
                    implementation = %closed.implementation(),
                    "Open binding shadowed by an existing binding"
                );
                continue;
            }

            tracing::debug!(
                dependency = %dependency,
                implementation = %closed.implementation(),
                lifetime = %closed.lifetime(),
                "Specialized open generic binding"
            );
            merged.push(Arc::new(ProviderEntry::new(closed, true)));
        }

        if merged.len() != before {
            table.replace(dependency, merged);
        }
        Ok(())
    }

    fn is_satisfiable(
        &self,
        table: &ProviderTable,
        dependency: &TypeDescriptor,
        name: Option<&Token>,
    ) -> bool {
        if let Some(entries) = table.entries.get(dependency) {
            if entries.iter().any(|entry| entry.binding().matches_name(name)) {
                return true;
            }
        } else if dependency.sequence_element().is_some() {
            return true;
        }
        self.open_candidates(dependency)
            .map_or(false, |open| open.iter().any(|binding| binding.matches_name(name)))
    }
}

impl fmt::Display for ResolverStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dependencies, {} closed, {} specialized, {} open ({} singleton, {} transient)",
            self.dependencies,
            self.closed_entries,
            self.specialized_entries,
            self.open_bindings,
            self.singleton_entries,
            self.transient_entries
        )
    }
}
