use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::{stream::FuturesUnordered, StreamExt};

use crate::{
    assembly::Assembly,
    container::Container,
    errors::AssembleError,
    injection::TypeRef,
    types::DynError,
};

/// A loaded module and the members it exports
#[derive(Debug, Clone)]
pub struct Module {
    pub id: String,
    pub members: Vec<TypeRef>,
}

/// Loads modules by their identifier
pub trait ModuleLoader: Send + Sync {
    fn load(&self, id: &str) -> impl Future<Output = Result<Module, AssembleError>> + Send;
}

impl AssembleError {
    /// Wraps a loader specific failure
    pub fn module_load(module: impl Into<String>, error: impl Into<DynError>) -> Self {
        AssembleError::ModuleLoad {
            module: module.into(),
            error: Arc::new(error.into()),
        }
    }
}

/// Static description of a module
///
/// Descriptors can be collected at link time into [LINKED_MODULES]:
/// ```ignore
/// #[linkme::distributed_slice(rigging_di::LINKED_MODULES)]
/// static USERS: ModuleDescriptor = ModuleDescriptor {
///     id: "users",
///     members: || vec![TypeRef::of::<UserService>()],
/// };
/// ```
#[derive(Clone, Copy)]
pub struct ModuleDescriptor {
    pub id: &'static str,
    pub members: fn() -> Vec<TypeRef>,
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleDescriptor").field(&self.id).finish()
    }
}

/// All module descriptors linked into the binary
#[linkme::distributed_slice]
pub static LINKED_MODULES: [ModuleDescriptor] = [..];

/// Loader serving modules from a table of descriptors
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<&'static str, ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of every descriptor submitted to [LINKED_MODULES]
    pub fn linked() -> Self {
        LINKED_MODULES
            .iter()
            .fold(Self::new(), |registry, descriptor| registry.with(*descriptor))
    }

    pub fn with(mut self, descriptor: ModuleDescriptor) -> Self {
        if self.modules.insert(descriptor.id, descriptor).is_some() {
            tracing::warn!("Module '{}' is described twice, using the last one", descriptor.id);
        }
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }
}

impl ModuleLoader for ModuleRegistry {
    async fn load(&self, id: &str) -> Result<Module, AssembleError> {
        let descriptor = self
            .modules
            .get(id)
            .ok_or_else(|| AssembleError::ModuleNotFound(id.to_string()))?;

        Ok(Module {
            id: descriptor.id.to_string(),
            members: (descriptor.members)(),
        })
    }
}

/// Loads modules and registers the declared registrations of their members
///
/// All modules load concurrently. A module registers only after it loaded and
/// all of its members' registrations were collected, so a failing module registers nothing.
/// Every other module still loads and registers; the first failure is returned afterwards.
#[derive(Debug)]
pub struct ModuleLoaderAssembly<L = ModuleRegistry> {
    loader: L,
    modules: Vec<String>,
}

impl<L: ModuleLoader> ModuleLoaderAssembly<L> {
    pub fn new(loader: L, modules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ModuleLoaderAssembly {
            loader,
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }
}

impl<L: ModuleLoader> Assembly for ModuleLoaderAssembly<L> {
    async fn assemble(&self, container: &Container) -> Result<(), AssembleError> {
        let mut loads = self
            .modules
            .iter()
            .map(|id| async move {
                let module = self.loader.load(id).await?;

                let mut entries = Vec::new();
                for member in &module.members {
                    entries.extend(member.registration_entries()?);
                }
                Ok::<_, AssembleError>((module.id, entries))
            })
            .collect::<FuturesUnordered<_>>();

        let module_count = loads.len();
        let mut loaded = 0;
        let mut first_error = None;

        // Drain every load, a failing module must not cancel the others
        while let Some(result) = loads.next().await {
            let (id, entries) = match result {
                Ok(module) => module,
                Err(e) => {
                    tracing::error!("Module loading for '{}' failed: {}", container.name(), e);
                    first_error.get_or_insert(e);
                    continue;
                }
            };

            loaded += 1;
            tracing::debug!(
                "Loaded module '{id}' with {} registrations [{loaded} of {module_count} complete]",
                entries.len()
            );

            for (qualifier, entry) in entries {
                if let Err(e) = container.register(qualifier, entry) {
                    first_error.get_or_insert(e.into());
                    break;
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
