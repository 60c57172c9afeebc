use std::{fmt, sync::Arc};

use crate::{
    errors::{DeclareError, ResolveError},
    injection::Declare,
    registration::RegistrationType,
    resolver::downcast_instance,
    types::{Dependency, Injectable, Instance, Qualifier, TargetKind, TypeInfo},
};

type ApplyFn<T> = Arc<dyn Fn(&mut T, &Instance) -> Result<(), ResolveError> + Send + Sync>;

/// Resolved dependency passed as constructor argument `index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInjection {
    pub qualifier: Qualifier,
    pub index: usize,
}

/// Resolved dependency assigned to `field`
pub struct PropertyInjection<T> {
    pub qualifier: Qualifier,
    pub field: &'static str,
    apply: ApplyFn<T>,
}

/// Resolved dependency handed to the single argument setter `setter`
pub struct MethodInjection<T> {
    pub qualifier: Qualifier,
    pub setter: &'static str,
    apply: ApplyFn<T>,
}

impl<T> PropertyInjection<T> {
    pub(crate) fn apply(&self, target: &mut T, dependency: &Instance) -> Result<(), ResolveError> {
        (self.apply)(target, dependency)
    }
}

impl<T> MethodInjection<T> {
    pub(crate) fn apply(&self, target: &mut T, dependency: &Instance) -> Result<(), ResolveError> {
        (self.apply)(target, dependency)
    }
}

// Manual impls - derive would require T: Clone
impl<T> Clone for PropertyInjection<T> {
    fn clone(&self) -> Self {
        PropertyInjection {
            qualifier: self.qualifier.clone(),
            field: self.field,
            apply: self.apply.clone(),
        }
    }
}
impl<T> Clone for MethodInjection<T> {
    fn clone(&self) -> Self {
        MethodInjection {
            qualifier: self.qualifier.clone(),
            setter: self.setter,
            apply: self.apply.clone(),
        }
    }
}
impl<T> fmt::Debug for PropertyInjection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInjection")
            .field("qualifier", &self.qualifier)
            .field("field", &self.field)
            .finish()
    }
}
impl<T> fmt::Debug for MethodInjection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInjection")
            .field("qualifier", &self.qualifier)
            .field("setter", &self.setter)
            .finish()
    }
}

fn typed_apply<T, U, F>(qualifier: Qualifier, apply: F) -> ApplyFn<T>
where
    T: 'static,
    U: Dependency,
    F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
{
    Arc::new(move |target: &mut T, instance: &Instance| {
        let dependency = downcast_instance::<U>(&qualifier, instance)?;
        apply(target, dependency);
        Ok(())
    })
}

/// Builder collecting the injection records of `T`
///
/// Every primitive refuses UI component types; the first refusal is reported by [Declaration::build].
pub struct Declaration<T: Injectable> {
    constructor: Vec<ConstructorInjection>,
    inherited_properties: Vec<PropertyInjection<T>>,
    inherited_methods: Vec<MethodInjection<T>>,
    properties: Vec<PropertyInjection<T>>,
    methods: Vec<MethodInjection<T>>,
    registrations: Vec<(Qualifier, RegistrationType)>,
    error: Option<DeclareError>,
}

impl<T: Injectable> Default for Declaration<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Injectable> Declaration<T> {
    pub fn new() -> Self {
        Declaration {
            constructor: Vec::new(),
            inherited_properties: Vec::new(),
            inherited_methods: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            registrations: Vec::new(),
            error: None,
        }
    }

    /// Returns false and remembers the error if `T` must not carry declarations
    fn guard(&mut self, primitive: &'static str) -> bool {
        if T::TARGET != TargetKind::ViewComponent {
            return true;
        }

        if self.error.is_none() {
            self.error = Some(DeclareError::UnsupportedTarget {
                target: std::any::type_name::<T>(),
                primitive,
            });
        }
        false
    }

    /// Passes the dependency registered as `qualifier` as constructor argument `index`
    pub fn inject_constructor(mut self, qualifier: impl Into<Qualifier>, index: usize) -> Self {
        if self.guard("inject_constructor") {
            self.constructor.push(ConstructorInjection {
                qualifier: qualifier.into(),
                index,
            });
        }
        self
    }

    /// Assigns the dependency registered as `qualifier` to `field`
    pub fn inject_property<U, F>(
        mut self,
        qualifier: impl Into<Qualifier>,
        field: &'static str,
        assign: F,
    ) -> Self
    where
        U: Dependency,
        F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
    {
        if self.guard("inject_property") {
            let qualifier = qualifier.into();
            self.properties.push(PropertyInjection {
                apply: typed_apply(qualifier.clone(), assign),
                qualifier,
                field,
            });
        }
        self
    }

    /// Calls `setter` with the dependency registered as `qualifier`
    pub fn inject_method<U, F>(
        mut self,
        qualifier: impl Into<Qualifier>,
        setter: &'static str,
        call: F,
    ) -> Self
    where
        U: Dependency,
        F: Fn(&mut T, Arc<U>) + Send + Sync + 'static,
    {
        if self.guard("inject_method") {
            let qualifier = qualifier.into();
            self.methods.push(MethodInjection {
                apply: typed_apply(qualifier.clone(), call),
                qualifier,
                setter,
            });
        }
        self
    }

    /// Registers `T` under `qualifier` once an assembly picks the type up.
    ///
    /// A type may register under several qualifiers, declaring the same qualifier twice keeps the last.
    pub fn registration(
        mut self,
        qualifier: impl Into<Qualifier>,
        registration_type: RegistrationType,
    ) -> Self {
        if self.guard("registration") {
            let qualifier = qualifier.into();
            self.registrations.retain(|(existing, _)| existing != &qualifier);
            self.registrations.push((qualifier, registration_type));
        }
        self
    }

    /// Registers `T` under `qualifier` with the default [RegistrationType::Container] lifetime
    pub fn registration_default(self, qualifier: impl Into<Qualifier>) -> Self {
        self.registration(qualifier, RegistrationType::default())
    }

    /// Inherits the property and method records of the embedded parent `P`.
    ///
    /// Parent records always run before the records declared on `T`.
    /// Constructor records and registrations of `P` are not inherited.
    pub fn extends<P: Declare>(mut self, project: fn(&mut T) -> &mut P) -> Self {
        if !self.guard("extends") {
            return self;
        }

        let parent = match InjectionMetadata::<P>::of() {
            Ok(parent) => parent,
            Err(e) => {
                self.error.get_or_insert(e);
                return self;
            }
        };

        for record in parent.properties {
            let apply = record.apply;
            self.inherited_properties.push(PropertyInjection {
                qualifier: record.qualifier,
                field: record.field,
                apply: Arc::new(move |target: &mut T, instance: &Instance| {
                    apply(project(target), instance)
                }),
            });
        }
        for record in parent.methods {
            let apply = record.apply;
            self.inherited_methods.push(MethodInjection {
                qualifier: record.qualifier,
                setter: record.setter,
                apply: Arc::new(move |target: &mut T, instance: &Instance| {
                    apply(project(target), instance)
                }),
            });
        }
        self
    }

    /// Finishes the declaration, failing if any primitive was refused
    pub fn build(self) -> Result<InjectionMetadata<T>, DeclareError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut constructor = self.constructor;
        constructor.sort_by_key(|record| record.index);

        let mut properties = self.inherited_properties;
        properties.extend(self.properties);
        let mut methods = self.inherited_methods;
        methods.extend(self.methods);

        Ok(InjectionMetadata {
            info: TypeInfo::of::<T>(),
            constructor,
            properties,
            methods,
            registrations: self.registrations,
        })
    }
}

/// Finished injection records of a type
///
/// Constructor records are sorted by index and belong to `T` alone.
/// Property and method records list ancestor records before the ones of `T`.
pub struct InjectionMetadata<T> {
    info: TypeInfo,
    constructor: Vec<ConstructorInjection>,
    properties: Vec<PropertyInjection<T>>,
    methods: Vec<MethodInjection<T>>,
    registrations: Vec<(Qualifier, RegistrationType)>,
}

impl<T: Declare> InjectionMetadata<T> {
    /// Collects the declaration of `T`
    pub fn of() -> Result<Self, DeclareError> {
        T::declare(Declaration::new()).build()
    }
}

impl<T> InjectionMetadata<T> {
    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn constructor_injections(&self) -> &[ConstructorInjection] {
        &self.constructor
    }

    pub fn property_injections(&self) -> &[PropertyInjection<T>] {
        &self.properties
    }

    pub fn method_injections(&self) -> &[MethodInjection<T>] {
        &self.methods
    }

    pub fn registrations(&self) -> &[(Qualifier, RegistrationType)] {
        &self.registrations
    }
}

impl<T> fmt::Debug for InjectionMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionMetadata")
            .field("type", &self.info.type_name)
            .field("constructor", &self.constructor)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("registrations", &self.registrations)
            .finish()
    }
}
