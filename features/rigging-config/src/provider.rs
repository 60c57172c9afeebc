use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use rigging_di::types::TypeInfo;

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, (TypeInfo, Arc<dyn Any + Send + Sync + 'static>)>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn initialize() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `Ok(None)` if no config of that type was added
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        self.configs
            .get(&TypeId::of::<T>())
            .map(|(info, entry)| entry.clone().downcast().map_err(|_| ConfigError::Missing(*info)))
            .transpose()
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();

        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        tracing::debug!("Adding config '{info}'");
        self.configs.insert(info.type_id, (info, Arc::new(config)));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl std::fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.configs.values().map(|(info, _)| info.type_name))
            .finish()
    }
}
