use std::future::Future;

use crate::{container::Container, errors::AssembleError};

mod class_loader;
mod manual;
mod module_loader;

pub use class_loader::ClassLoaderAssembly;
pub use manual::{ManualRegistration, ManualRegistrationAssembly};
pub use module_loader::{
    Module, ModuleDescriptor, ModuleLoader, ModuleLoaderAssembly, ModuleRegistry, LINKED_MODULES,
};

/// A source of registrations
///
/// An assembly registers everything it knows into the given container.
/// If it fails, entries registered before the failure stay registered.
pub trait Assembly: Send + Sync {
    fn assemble(
        &self,
        container: &Container,
    ) -> impl Future<Output = Result<(), AssembleError>> + Send;
}

/// Object safe wrapper around [Assembly], used to hold assemblies of different types
pub trait DynAssembly: Send + Sync {
    fn assemble_boxed<'a>(
        &'a self,
        container: &'a Container,
    ) -> Box<dyn Future<Output = Result<(), AssembleError>> + Send + 'a>;
}
// Impl DynAssembly for any Assembly
impl<SpecificAssembly: Assembly> DynAssembly for SpecificAssembly {
    fn assemble_boxed<'a>(
        &'a self,
        container: &'a Container,
    ) -> Box<dyn Future<Output = Result<(), AssembleError>> + Send + 'a> {
        // Forward the call to the specific implementation
        Box::new(SpecificAssembly::assemble(self, container))
    }
}
