use std::{fmt, sync::Arc};

use crate::{
    errors::{DeclareError, ResolveError},
    injection::{Declare, InjectionMetadata},
    registration::RegistrationEntry,
    resolver::{downcast_instance, Resolver},
    types::{Dependency, DynError, Instance, Qualifier, TypeInfo},
};

/// Constructor arguments resolved from constructor injections
///
/// Positions without an injection record are empty.
pub struct ConstructorArgs {
    target: TypeInfo,
    args: Vec<Option<(Qualifier, Instance)>>,
}

impl ConstructorArgs {
    fn new(target: TypeInfo) -> Self {
        ConstructorArgs {
            target,
            args: Vec::new(),
        }
    }

    fn set(&mut self, index: usize, qualifier: Qualifier, instance: Instance) {
        if self.args.len() <= index {
            self.args.resize_with(index + 1, || None);
        }
        self.args[index] = Some((qualifier, instance));
    }

    /// Number of argument positions, including empty ones
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Argument at `index`, `None` if no injection targets it
    pub fn get<U: Dependency>(&self, index: usize) -> Result<Option<Arc<U>>, ResolveError> {
        match self.args.get(index) {
            Some(Some((qualifier, instance))) => downcast_instance(qualifier, instance).map(Some),
            _ => Ok(None),
        }
    }

    /// Argument at `index`, failing if no injection targets it
    pub fn require<U: Dependency>(&self, index: usize) -> Result<Arc<U>, ResolveError> {
        self.get(index)?.ok_or(ResolveError::MissingArgument {
            target: self.target.type_name,
            index,
        })
    }
}

impl fmt::Debug for ConstructorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for arg in &self.args {
            match arg {
                Some((qualifier, _)) => list.entry(&format_args!("{qualifier}")),
                None => list.entry(&format_args!("_")),
            };
        }
        list.finish()
    }
}

/// Builds a fully injected instance of `T`
///
/// The order is fixed: constructor arguments by ascending index, construction,
/// `post_constructor`, property injections, method injections, `awake_after_injection`.
/// Every dependency is requested with the short type name of `T` as requester.
pub fn instantiate<T: Declare>(
    metadata: &InjectionMetadata<T>,
    resolver: &dyn Resolver,
) -> Result<T, DynError> {
    let info = metadata.type_info();
    let requester = info.short_name();

    let mut args = ConstructorArgs::new(info);
    for record in metadata.constructor_injections() {
        let instance = resolver.resolve_instance(&record.qualifier, requester)?;
        args.set(record.index, record.qualifier.clone(), instance);
    }

    let mut instance = T::construct(&args)?;
    instance.post_constructor();

    for record in metadata.property_injections() {
        let dependency = resolver.resolve_instance(&record.qualifier, requester)?;
        record.apply(&mut instance, &dependency)?;
    }

    for record in metadata.method_injections() {
        let dependency = resolver.resolve_instance(&record.qualifier, requester)?;
        record.apply(&mut instance, &dependency)?;
    }

    instance.awake_after_injection();

    tracing::debug!("Instantiated {}", info.type_name);
    Ok(instance)
}

/// Registration entries declared by `T`, each building through [instantiate]
pub fn registration_entries<T: Declare>(
) -> Result<Vec<(Qualifier, RegistrationEntry)>, DeclareError> {
    let metadata = Arc::new(InjectionMetadata::<T>::of()?);

    let entries = metadata
        .registrations()
        .iter()
        .map(|(qualifier, registration_type)| {
            let metadata = metadata.clone();
            let entry = RegistrationEntry::new(*registration_type, move |resolver| {
                instantiate(&metadata, resolver)
            });
            (qualifier.clone(), entry)
        })
        .collect();

    Ok(entries)
}

/// Type erased reference to a type, carrying its registration descriptors
#[derive(Clone, Copy)]
pub struct TypeRef {
    info: TypeInfo,
    entries: fn() -> Result<Vec<(Qualifier, RegistrationEntry)>, DeclareError>,
}

impl TypeRef {
    pub fn of<T: Declare>() -> Self {
        TypeRef {
            info: TypeInfo::of::<T>(),
            entries: registration_entries::<T>,
        }
    }

    /// Reference to a type that declares nothing
    pub fn undeclared<T: 'static>() -> Self {
        TypeRef {
            info: TypeInfo::of::<T>(),
            entries: || Ok(Vec::new()),
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    /// Registration entries declared by the referenced type
    pub fn registration_entries(&self) -> Result<Vec<(Qualifier, RegistrationEntry)>, DeclareError> {
        (self.entries)()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.info.type_name).finish()
    }
}
