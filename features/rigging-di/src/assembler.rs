use std::sync::Arc;

use futures::future::join_all;

use crate::{
    assembly::{Assembly, DynAssembly},
    container::Container,
    errors::{AssemblerError, ResolveError},
    resolver::Resolver,
    types::{Dependency, Instance, Qualifier},
};

//////////////////////////////////////////////////////////////////////
///
/// Assembling consists of three parts.
/// 1. Every assembly registers its dependencies into the container
/// 2. Once all assemblies completed, the container finishes registration and builds eager instances
/// 3. The sealed container is handed out as a read only resolver
pub struct Assembler {
    /// Assemblies run in list order
    assemblies: Vec<Box<dyn DynAssembly>>,
    container: Arc<Container>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Assembler targeting the process wide default container
    pub fn new() -> Self {
        Self::with_container(Container::default_container())
    }

    pub fn with_container(container: Arc<Container>) -> Self {
        Assembler {
            assemblies: Vec::new(),
            container,
        }
    }

    pub fn add_assembly<A: Assembly + 'static>(mut self, assembly: A) -> Self {
        self.assemblies.push(Box::new(assembly));
        self
    }

    pub fn add_boxed(mut self, assembly: Box<dyn DynAssembly>) -> Self {
        self.assemblies.push(assembly);
        self
    }

    /// Runs all assemblies and seals the container.
    ///
    /// Assemblies are started in list order and awaited together. If any of them fails
    /// the container is left open and the first failure in list order is returned.
    pub async fn assemble(self) -> Result<AssembledResolver, AssemblerError> {
        tracing::debug!(
            "Assembling container '{}' from {} assemblies",
            self.container.name(),
            self.assemblies.len()
        );

        let assemblies = self
            .assemblies
            .iter()
            .map(|assembly| Box::into_pin(assembly.assemble_boxed(&self.container)));

        let results = join_all(assemblies).await;

        for (index, result) in results.into_iter().enumerate() {
            if let Err(error) = result {
                tracing::error!(
                    "Assembly #{index} of container '{}' failed: {error}",
                    self.container.name()
                );
                return Err(AssemblerError::Assembly { index, error });
            }
        }

        self.container
            .finish_registration()
            .await
            .map_err(AssemblerError::Finalization)?;

        tracing::debug!("Container '{}' assembled", self.container.name());

        Ok(AssembledResolver {
            container: self.container,
        })
    }
}

/// Read only view of an assembled container
#[derive(Clone, Debug)]
pub struct AssembledResolver {
    container: Arc<Container>,
}

impl AssembledResolver {
    /// Resolves and downcasts the instance registered for `qualifier`
    pub fn resolve<T: Dependency>(
        &self,
        qualifier: impl Into<Qualifier>,
        requester: &str,
    ) -> Result<Arc<T>, ResolveError> {
        self.container.resolve(qualifier, requester)
    }

    /// True if this resolver reads from `container`
    pub fn is_backed_by(&self, container: &Arc<Container>) -> bool {
        Arc::ptr_eq(&self.container, container)
    }
}

impl Resolver for AssembledResolver {
    fn name(&self) -> &str {
        self.container.name()
    }

    fn resolve_instance(
        &self,
        qualifier: &Qualifier,
        requester: &str,
    ) -> Result<Instance, ResolveError> {
        self.container.resolve_instance(qualifier, requester)
    }

    fn contains(&self, qualifier: &Qualifier) -> bool {
        self.container.contains(qualifier)
    }
}
