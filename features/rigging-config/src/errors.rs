use rigging_di::{errors::ResolveError, types::TypeInfo};

/// Errors when registering or acquiring a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// The required Config is not known
    #[error("The required Config type '{0}' is not known")]
    Missing(TypeInfo),
    /// The Config is already registered
    #[error("The Config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
    /// The ConfigProvider could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
