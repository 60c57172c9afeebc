use std::{any::type_name, sync::Arc};

use crate::{
    errors::ResolveError,
    types::{Dependency, Instance, Qualifier},
};

/// Read-only capability to look up dependencies by qualifier
///
/// This is the only surface handed to factories and to consumers of an assembled container.
pub trait Resolver: Send + Sync {
    /// Name of the underlying container, used in diagnostics
    fn name(&self) -> &str;

    /// Resolves the instance registered for `qualifier`.
    ///
    /// `requester` names whoever asks for the dependency and is only used for error reporting.
    fn resolve_instance(&self, qualifier: &Qualifier, requester: &str)
        -> Result<Instance, ResolveError>;

    /// Returns true if something is registered for `qualifier`
    fn contains(&self, qualifier: &Qualifier) -> bool;
}

impl dyn Resolver + '_ {
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
}

pub(crate) fn downcast_instance<T: Dependency>(
    qualifier: &Qualifier,
    instance: &Instance,
) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            qualifier: qualifier.clone(),
            required_type: type_name::<T>(),
            actual_type,
        })
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve_instance(
        &self,
        qualifier: &Qualifier,
        requester: &str,
    ) -> Result<Instance, ResolveError> {
        (**self).resolve_instance(qualifier, requester)
    }

    fn contains(&self, qualifier: &Qualifier) -> bool {
        (**self).contains(qualifier)
    }
}
