use std::{ops::Deref, sync::Arc};

use rigging_di::{
    assembly::Assembly,
    container::Container,
    errors::AssembleError,
    registration::RegistrationEntry,
    resolver::Resolver,
    types::{Dependency, TypeInfo},
};

use crate::{errors::ConfigError, provider::ConfigProvider};

/// Qualifier the [ConfigProvider] is registered under
pub const CONFIG_PROVIDER_QUALIFIER: &str = "ConfigProvider";

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry
/// from within any factory.
///
/// # Example
/// ```rust
/// use futures::executor::block_on;
/// use rigging_config::{config::{Config, ConfigAssembly}, provider::ConfigProvider};
/// use rigging_di::{Assembler, Container, RegistrationEntry, Resolver};
/// use std::sync::Arc;
///
/// struct ModuleConfig {
///     enabled: bool,
/// }
///
/// struct Module {
///     enabled: bool,
/// }
///
/// let mut provider = ConfigProvider::default();
/// provider.add_config(ModuleConfig { enabled: true }).unwrap();
///
/// let resolver = block_on(
///     Assembler::with_container(Arc::new(Container::new("Config")))
///         .add_assembly(ConfigAssembly::new(provider))
///         .add_assembly(rigging_di::ManualRegistrationAssembly::default().with(
///             "Module",
///             RegistrationEntry::container(|resolver: &dyn Resolver| {
///                 let config = Config::<ModuleConfig>::resolve(resolver, "Module")?;
///                 Ok(Module { enabled: config.enabled })
///             }),
///         ))
///         .assemble(),
/// )
/// .unwrap();
///
/// assert!(resolver.resolve::<Module>("Module", "doc").unwrap().enabled);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Dependency> Config<T> {
    /// Fetches the config of type `T` from the [ConfigProvider] registered in `resolver`
    pub fn resolve(resolver: &dyn Resolver, requester: &str) -> Result<Self, ConfigError> {
        let provider = resolver.resolve::<ConfigProvider>(CONFIG_PROVIDER_QUALIFIER, requester)?;

        let inner = provider
            .get_config::<T>()?
            .ok_or_else(|| ConfigError::Missing(TypeInfo::of::<T>()))?;

        Ok(Config { inner })
    }
}

/// Registers a [ConfigProvider] into the container
#[derive(Debug, Clone)]
pub struct ConfigAssembly {
    provider: Arc<ConfigProvider>,
}

impl ConfigAssembly {
    pub fn new(provider: ConfigProvider) -> Self {
        ConfigAssembly {
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> Arc<ConfigProvider> {
        self.provider.clone()
    }
}

impl Assembly for ConfigAssembly {
    async fn assemble(&self, container: &Container) -> Result<(), AssembleError> {
        tracing::debug!(
            "Registering {} configs into '{}'",
            self.provider.len(),
            container.name()
        );
        container.register(
            CONFIG_PROVIDER_QUALIFIER,
            RegistrationEntry::shared(self.provider.clone()),
        )?;
        Ok(())
    }
}
