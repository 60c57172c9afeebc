use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, Qualifier};

/// Errors when registering into a container
#[derive(Error, Debug, Clone)]
pub enum RegisterError {
    /// The container was already sealed by `finish_registration`
    #[error("Trying to register '{qualifier}' in '{container}'. It is illegal after calling 'finish_registration()'")]
    RegistrationClosed {
        container: String,
        qualifier: Qualifier,
    },
    /// The lifecycle type is not one of the recognized values
    #[error("Invalid registration type '{value}' for qualifier '{qualifier}'")]
    InvalidRegistrationType { qualifier: Qualifier, value: String },
}

/// Errors when resolving a qualifier
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Nothing is registered for the qualifier
    #[error("No registration in container '{container}' for qualifier '{qualifier}' requested by '{requester}'")]
    NotRegistered {
        container: String,
        qualifier: Qualifier,
        requester: String,
    },

    #[error("Failed to downcast '{qualifier}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        qualifier: Qualifier,
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// A constructor asked for an argument no constructor injection provides
    #[error("Constructor argument #{index} of '{target}' has no injection")]
    MissingArgument { target: &'static str, index: usize },

    /// A factory failed to build
    #[error("Factory for '{qualifier}' failed - error: {error}")]
    FactoryFailed {
        qualifier: Qualifier,
        error: Arc<DynError>,
    },
}

impl ResolveError {
    /// Turns a factory error into a resolve error.
    ///
    /// Resolve errors raised inside the factory (e.g. a missing nested dependency)
    /// are passed on unchanged.
    pub(crate) fn from_factory(qualifier: &Qualifier, error: DynError) -> Self {
        match error.downcast::<ResolveError>() {
            Ok(resolve_error) => *resolve_error,
            Err(error) => ResolveError::FactoryFailed {
                qualifier: qualifier.clone(),
                error: Arc::new(error),
            },
        }
    }
}

/// Errors raised by the declaration primitives
#[derive(Error, Debug, Clone)]
pub enum DeclareError {
    #[error("'{primitive}' must not be used on UI components. Usage on '{target}' is invalid.")]
    UnsupportedTarget {
        target: &'static str,
        primitive: &'static str,
    },
}

/// Errors while an assembly populates a container
#[derive(Error, Debug, Clone)]
pub enum AssembleError {
    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Declare(#[from] DeclareError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// No loader knows the module
    #[error("Module '{0}' is not known to the loader")]
    ModuleNotFound(String),

    /// The loader failed to load the module
    #[error("Failed to load module '{module}' - error: {error}")]
    ModuleLoad {
        module: String,
        error: Arc<DynError>,
    },
}

/// Errors of the assembler protocol
#[derive(Error, Debug, Clone)]
pub enum AssemblerError {
    /// One of the assemblies failed, the container was not sealed
    #[error("Assembly #{index} failed: {error}")]
    Assembly { index: usize, error: AssembleError },

    /// Eager construction failed while sealing the container
    #[error("Finishing registration failed: {0}")]
    Finalization(#[source] ResolveError),
}
