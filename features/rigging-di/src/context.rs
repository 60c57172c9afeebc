use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::container::Container;

/// How a component gets its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Isolation {
    /// Every component shares the context's default container
    #[default]
    Shared,
    /// Every component gets its own container, e.g. to isolate tests
    PerComponent,
}

/// Owns the containers handed to components
///
/// Replaces implicit global state: the harness creates a context, picks the isolation
/// explicitly, and tears it down when done.
pub struct ContainerContext {
    default: Arc<Container>,
    isolated: Mutex<HashMap<String, Arc<Container>>>,
}

impl Default for ContainerContext {
    /// Context sharing the process wide default container
    fn default() -> Self {
        Self::with_default(Container::default_container())
    }
}

impl ContainerContext {
    /// Context with a fresh default container named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_default(Arc::new(Container::new(name)))
    }

    pub fn with_default(default: Arc<Container>) -> Self {
        ContainerContext {
            default,
            isolated: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_container(&self) -> Arc<Container> {
        self.default.clone()
    }

    fn isolated(&self) -> MutexGuard<'_, HashMap<String, Arc<Container>>> {
        self.isolated.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Container to use for `component`
    ///
    /// With [Isolation::PerComponent] the first call creates a container named
    /// `<component>::Container`, later calls return the same one.
    pub fn container_for(&self, component: &str, isolation: Isolation) -> Arc<Container> {
        match isolation {
            Isolation::Shared => self.default.clone(),
            Isolation::PerComponent => self
                .isolated()
                .entry(component.to_string())
                .or_insert_with(|| {
                    tracing::debug!("Creating isolated container for '{component}'");
                    Arc::new(Container::new(format!("{component}::Container")))
                })
                .clone(),
        }
    }

    /// Clears every container of this context and forgets isolated ones
    pub fn teardown(&self) {
        for (_, container) in self.isolated().drain() {
            container.clear();
        }
        self.default.clear();
    }
}
