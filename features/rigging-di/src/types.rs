use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// Boxed error produced by factories and module loaders
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything the container can store and hand out.
///
/// Instances may be shared across threads, so everything
/// stored needs to be Send + Sync + 'static
pub trait Dependency: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Dependency for T {}

/// What kind of type a declaration is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A plain service built by the container
    Service,
    /// A UI component - built by the view binding layer, never by the container
    ViewComponent,
}

/// Lifecycle contract of every type built through the injection protocol
///
/// `post_constructor` sees the bare instance, before any property or method injection.
/// `awake_after_injection` sees the fully injected instance.
pub trait Injectable: Dependency + Sized {
    const TARGET: TargetKind = TargetKind::Service;

    fn post_constructor(&mut self) {}

    fn awake_after_injection(&mut self) {}
}

/// Shared, type erased instance handed out by a container
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<T: Dependency>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<T: Dependency>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance,
        }
    }

    pub fn downcast<T: Dependency>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    /// True if both handles point at the very same instance
    pub fn same(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Type name without its module path, used as requester name
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    // Generic arguments may contain paths as well, only strip the outer one
    let outer = full.split('<').next().unwrap_or(full);
    match outer.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// Key identifying one registration within a container
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Qualifier {
    /// Plain string key
    Name(Arc<str>),
    /// Unique key derived from a Rust type
    Type(TypeInfo),
}

impl Qualifier {
    pub fn of<T: 'static + ?Sized>() -> Self {
        Qualifier::Type(TypeInfo::of::<T>())
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Name(name) => f.write_str(name),
            Qualifier::Type(info) => write!(f, "<{}>", info.type_name),
        }
    }
}

impl From<&str> for Qualifier {
    fn from(value: &str) -> Self {
        Qualifier::Name(Arc::from(value))
    }
}
impl From<String> for Qualifier {
    fn from(value: String) -> Self {
        Qualifier::Name(Arc::from(value))
    }
}
impl From<&Qualifier> for Qualifier {
    fn from(value: &Qualifier) -> Self {
        value.clone()
    }
}
impl From<TypeInfo> for Qualifier {
    fn from(value: TypeInfo) -> Self {
        Qualifier::Type(value)
    }
}
