use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    errors::RegisterError,
    resolver::Resolver,
    types::{Dependency, DynError, Instance, Qualifier, TypeInfo},
};

/// Lifecycle policy of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationType {
    /// A new instance is created on every resolution
    Transient,
    /// The first resolved instance is kept for the lifetime of the container
    #[default]
    Container,
    /// Same as `Container`, but constructed while the registration is finished
    ContainerEager,
}

impl RegistrationType {
    /// True if instances of this type are cached by the container
    pub fn is_cached(self) -> bool {
        matches!(
            self,
            RegistrationType::Container | RegistrationType::ContainerEager
        )
    }

    /// Parses an unchecked lifecycle type, as used by `Container::register_raw`
    pub fn parse_for(qualifier: &Qualifier, raw: &str) -> Result<Self, RegisterError> {
        raw.parse().map_err(|_: RegisterError| RegisterError::InvalidRegistrationType {
            qualifier: qualifier.clone(),
            value: raw.to_string(),
        })
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistrationType::Transient => "transient",
            RegistrationType::Container => "container",
            RegistrationType::ContainerEager => "container_eager",
        })
    }
}

impl FromStr for RegistrationType {
    type Err = RegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "transient" => Ok(RegistrationType::Transient),
            "container" => Ok(RegistrationType::Container),
            "container_eager" | "container-eager" => Ok(RegistrationType::ContainerEager),
            _ => Err(RegisterError::InvalidRegistrationType {
                qualifier: Qualifier::from("<unknown>"),
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<u8> for RegistrationType {
    type Error = RegisterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RegistrationType::Transient),
            1 => Ok(RegistrationType::Container),
            2 => Ok(RegistrationType::ContainerEager),
            _ => Err(RegisterError::InvalidRegistrationType {
                qualifier: Qualifier::from("<unknown>"),
                value: value.to_string(),
            }),
        }
    }
}

/// Type erased factory of a registration
pub type DynFactory = Arc<dyn Fn(&dyn Resolver) -> Result<Instance, DynError> + Send + Sync>;

/// A lifecycle policy bound to a factory
///
/// Immutable once created and cheap to clone.
#[derive(Clone)]
pub struct RegistrationEntry {
    registration_type: RegistrationType,
    provides: TypeInfo,
    factory: DynFactory,
}

impl RegistrationEntry {
    pub fn new<T, F>(registration_type: RegistrationType, factory: F) -> Self
    where
        T: Dependency,
        F: Fn(&dyn Resolver) -> Result<T, DynError> + Send + Sync + 'static,
    {
        RegistrationEntry {
            registration_type,
            provides: TypeInfo::of::<T>(),
            factory: Arc::new(move |resolver: &dyn Resolver| {
                factory(resolver).map(Instance::new)
            }),
        }
    }

    pub fn transient<T, F>(factory: F) -> Self
    where
        T: Dependency,
        F: Fn(&dyn Resolver) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Self::new(RegistrationType::Transient, factory)
    }

    pub fn container<T, F>(factory: F) -> Self
    where
        T: Dependency,
        F: Fn(&dyn Resolver) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Self::new(RegistrationType::Container, factory)
    }

    pub fn eager<T, F>(factory: F) -> Self
    where
        T: Dependency,
        F: Fn(&dyn Resolver) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Self::new(RegistrationType::ContainerEager, factory)
    }

    /// Container scoped entry handing out an already built value
    pub fn instance<T: Dependency>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Container scoped entry handing out an already shared value
    pub fn shared<T: Dependency>(value: Arc<T>) -> Self {
        let instance = Instance::from_arc(value);
        RegistrationEntry {
            registration_type: RegistrationType::Container,
            provides: instance.info,
            factory: Arc::new(move |_: &dyn Resolver| Ok::<_, DynError>(instance.clone())),
        }
    }

    /// Builds an entry from an already type erased factory
    pub fn from_dyn(
        registration_type: RegistrationType,
        provides: TypeInfo,
        factory: DynFactory,
    ) -> Self {
        RegistrationEntry {
            registration_type,
            provides,
            factory,
        }
    }

    pub fn registration_type(&self) -> RegistrationType {
        self.registration_type
    }

    /// Type produced by the factory
    pub fn provides(&self) -> TypeInfo {
        self.provides
    }

    pub(crate) fn construct(&self, resolver: &dyn Resolver) -> Result<Instance, DynError> {
        (self.factory)(resolver)
    }
}

impl fmt::Debug for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationEntry")
            .field("registration_type", &self.registration_type)
            .field("provides", &self.provides.type_name)
            .finish()
    }
}
