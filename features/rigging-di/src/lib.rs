//! Rigging DI binds qualifiers to construction policies and wires dependencies
//! into objects based on statically declared injection records.
//!
//! Rigging DI is split into three parts:
//! 1. [Container]: registry of qualifiers and lifecycles, resolving instances on demand
//! 2. [injection]: per type injection records and the one procedure building such types
//! 3. [Assembler]: loads several [Assembly] sources into one container and seals it
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use futures::executor::block_on;
//! use rigging_di::{
//!     Assembler, ClassLoaderAssembly, ConstructorArgs, Container, Declaration, Declare, DynError,
//!     Injectable, ManualRegistrationAssembly, RegistrationEntry, RegistrationType, TypeRef,
//! };
//!
//! struct Greeter {
//!     name: Arc<String>,
//! }
//!
//! impl Injectable for Greeter {}
//! impl Declare for Greeter {
//!     fn construct(args: &ConstructorArgs) -> Result<Self, DynError> {
//!         Ok(Greeter { name: args.require(0)? })
//!     }
//!
//!     fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
//!         declaration
//!             .inject_constructor("name", 0)
//!             .registration("greeter", RegistrationType::Container)
//!     }
//! }
//!
//! let container = Arc::new(Container::new("Example"));
//! let resolver = block_on(
//!     Assembler::with_container(container)
//!         .add_assembly(
//!             ManualRegistrationAssembly::default()
//!                 .with("name", RegistrationEntry::instance("rigging".to_string())),
//!         )
//!         .add_assembly(ClassLoaderAssembly::new(vec![TypeRef::of::<Greeter>()]))
//!         .assemble(),
//! )
//! .unwrap();
//!
//! let greeter = resolver.resolve::<Greeter>("greeter", "example").unwrap();
//! assert_eq!(greeter.name.as_str(), "rigging");
//! ```

pub mod assembler;
pub mod assembly;
pub mod container;
pub mod context;
pub mod errors;
pub mod injection;
pub mod registration;
pub mod resolver;
pub mod types;

pub use assembler::{AssembledResolver, Assembler};
pub use assembly::{
    Assembly, ClassLoaderAssembly, DynAssembly, ManualRegistration, ManualRegistrationAssembly,
    Module, ModuleDescriptor, ModuleLoader, ModuleLoaderAssembly, ModuleRegistry, LINKED_MODULES,
};
pub use container::{Container, DEFAULT_CONTAINER_NAME};
pub use context::{ContainerContext, Isolation};
pub use errors::{AssembleError, AssemblerError, DeclareError, RegisterError, ResolveError};
pub use injection::{
    instantiate, registration_entries, ConstructorArgs, Declaration, Declare, InjectionMetadata,
    TypeRef,
};
pub use registration::{RegistrationEntry, RegistrationType};
pub use resolver::Resolver;
pub use types::{Dependency, DynError, Injectable, Instance, Qualifier, TargetKind, TypeInfo};

// Re-exported so module descriptors can be submitted without a direct dependency
pub use linkme;
