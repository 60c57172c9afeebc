use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use crate::{
    errors::{RegisterError, ResolveError},
    registration::{RegistrationEntry, RegistrationType},
    resolver::{downcast_instance, Resolver},
    types::{Dependency, DynError, Instance, Qualifier},
};

/// Name of the process wide default container
pub const DEFAULT_CONTAINER_NAME: &str = "DefaultContainer";

static DEFAULT_CONTAINER: OnceLock<Arc<Container>> = OnceLock::new();

/// Registry binding qualifiers to registrations, resolving instances on demand
///
/// A container is open for registrations until `finish_registration` runs,
/// afterwards it only resolves. `clear` resets it to a fresh, open state.
pub struct Container {
    name: String,
    state: Mutex<ContainerState>,
}

#[derive(Default)]
struct ContainerState {
    registrations: HashMap<Qualifier, RegistrationEntry>,
    /// Cached instances of container scoped registrations
    instances: HashMap<Qualifier, Instance>,
    /// Eager qualifiers in registration order
    eager_qualifiers: Vec<Qualifier>,
    finished: bool,
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        let mut map = f.debug_struct("Container");
        map.field("name", &self.name);
        map.field("finished", &state.finished);
        for (qualifier, entry) in &state.registrations {
            let val = if state.instances.contains_key(qualifier) {
                "constructed"
            } else {
                "registered"
            };
            map.field(
                &qualifier.to_string(),
                &format_args!("{} ({val})", entry.registration_type()),
            );
        }
        map.finish()
    }
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Container {
            name: name.into(),
            state: Mutex::new(ContainerState::default()),
        }
    }

    /// Lazily created container shared by the whole process
    ///
    /// Only a convenience default - containers can always be created and passed explicitly.
    pub fn default_container() -> Arc<Container> {
        DEFAULT_CONTAINER
            .get_or_init(|| Arc::new(Container::new(DEFAULT_CONTAINER_NAME)))
            .clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> MutexGuard<'_, ContainerState> {
        // State is never left half updated, so a poisoned lock is still usable
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("State of container '{}' poisoned, recovering", self.name);
                poisoned.into_inner()
            }
        }
    }

    /// Registers `entry` under `qualifier`
    ///
    /// Registering an already used qualifier replaces the previous entry.
    pub fn register(
        &self,
        qualifier: impl Into<Qualifier>,
        entry: RegistrationEntry,
    ) -> Result<(), RegisterError> {
        let qualifier = qualifier.into();
        let mut state = self.state();

        if state.finished {
            return Err(RegisterError::RegistrationClosed {
                container: self.name.clone(),
                qualifier,
            });
        }

        let registration_type = entry.registration_type();
        if state
            .registrations
            .insert(qualifier.clone(), entry)
            .is_some()
        {
            tracing::warn!(
                "Duplicate registration for qualifier '{}' in container '{}'. Container will use the last one.",
                qualifier,
                self.name
            );
        }

        if registration_type == RegistrationType::ContainerEager {
            if !state.eager_qualifiers.contains(&qualifier) {
                state.eager_qualifiers.push(qualifier.clone());
            }
        } else {
            // An overwritten eager registration is no longer built on finish
            state.eager_qualifiers.retain(|eager| eager != &qualifier);
        }

        tracing::debug!(
            "Registered '{}' as {} in container '{}'",
            qualifier,
            registration_type,
            self.name
        );
        Ok(())
    }

    /// Registers a factory with a lifecycle type that has not been validated yet
    ///
    /// Fails with `InvalidRegistrationType` if `raw_type` is not a known lifecycle type.
    pub fn register_raw<T, F>(
        &self,
        qualifier: impl Into<Qualifier>,
        raw_type: &str,
        factory: F,
    ) -> Result<(), RegisterError>
    where
        T: Dependency,
        F: Fn(&dyn Resolver) -> Result<T, DynError> + Send + Sync + 'static,
    {
        let qualifier = qualifier.into();
        if self.is_finished() {
            return Err(RegisterError::RegistrationClosed {
                container: self.name.clone(),
                qualifier,
            });
        }

        let registration_type = RegistrationType::parse_for(&qualifier, raw_type)?;
        self.register(qualifier, RegistrationEntry::new(registration_type, factory))
    }

    /// Resolves and downcasts the instance registered for `qualifier`
    pub fn resolve<T: Dependency>(
        &self,
        qualifier: impl Into<Qualifier>,
        requester: &str,
    ) -> Result<Arc<T>, ResolveError> {
        let qualifier = qualifier.into();
        let instance = self.resolve_instance(&qualifier, requester)?;
        downcast_instance(&qualifier, &instance)
    }

    /// Resets registrations, cached instances and eager qualifiers, and reopens the container
    pub fn clear(&self) {
        *self.state() = ContainerState::default();
        tracing::debug!("Cleared container '{}'", self.name);
    }

    /// Constructs all eager registrations in registration order and seals the container.
    ///
    /// The first failing eager factory aborts the batch and its error is returned.
    /// The container is sealed either way; instances built before the failure stay cached.
    pub async fn finish_registration(&self) -> Result<(), ResolveError> {
        let eager_qualifiers = self.state().eager_qualifiers.clone();

        tracing::debug!(
            "Finishing registration of '{}' with {} eager registrations",
            self.name,
            eager_qualifiers.len()
        );

        let result = eager_qualifiers.iter().try_for_each(|qualifier| {
            self.resolve_instance(qualifier, &self.name).map(|_| ())
        });

        self.state().finished = true;

        if let Err(e) = &result {
            tracing::error!(
                "Eager construction in container '{}' aborted: {}",
                self.name,
                e
            );
        }

        result
    }

    pub fn is_finished(&self) -> bool {
        self.state().finished
    }

    /// Number of registered qualifiers
    pub fn len(&self) -> usize {
        self.state().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Eager qualifiers in the order they will be constructed
    pub fn eager_qualifiers(&self) -> Vec<Qualifier> {
        self.state().eager_qualifiers.clone()
    }

    /// Returns true if an instance for `qualifier` is cached
    pub fn is_constructed(&self, qualifier: &Qualifier) -> bool {
        self.state().instances.contains_key(qualifier)
    }
}

impl Resolver for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_instance(
        &self,
        qualifier: &Qualifier,
        requester: &str,
    ) -> Result<Instance, ResolveError> {
        // Never hold the lock while a factory runs - factories resolve their own dependencies
        let entry = {
            let state = self.state();
            let Some(entry) = state.registrations.get(qualifier) else {
                tracing::error!(
                    "'{}' requested unregistered qualifier '{}' from container '{}'",
                    requester,
                    qualifier,
                    self.name
                );
                return Err(ResolveError::NotRegistered {
                    container: self.name.clone(),
                    qualifier: qualifier.clone(),
                    requester: requester.to_string(),
                });
            };

            if entry.registration_type().is_cached() {
                if let Some(instance) = state.instances.get(qualifier) {
                    return Ok(instance.clone());
                }
            }

            entry.clone()
        };

        let instance = entry
            .construct(self)
            .map_err(|e| ResolveError::from_factory(qualifier, e))?;

        if !entry.registration_type().is_cached() {
            return Ok(instance);
        }

        tracing::debug!(
            "Constructed instance of '{}' ({}) in container '{}'",
            qualifier,
            instance.info.type_name,
            self.name
        );

        // First cached instance wins, should the factory have resolved its own qualifier
        let cached = self
            .state()
            .instances
            .entry(qualifier.clone())
            .or_insert(instance)
            .clone();
        Ok(cached)
    }

    fn contains(&self, qualifier: &Qualifier) -> bool {
        self.state().registrations.contains_key(qualifier)
    }
}
