use crate::{
    assembly::Assembly,
    container::Container,
    errors::AssembleError,
    registration::RegistrationEntry,
    types::Qualifier,
};

/// Qualifier and entry to register as is
#[derive(Debug, Clone)]
pub struct ManualRegistration {
    pub qualifier: Qualifier,
    pub entry: RegistrationEntry,
}

/// Registers an explicit list of entries, in list order
#[derive(Debug, Clone, Default)]
pub struct ManualRegistrationAssembly {
    registrations: Vec<ManualRegistration>,
}

impl ManualRegistrationAssembly {
    pub fn new(registrations: Vec<ManualRegistration>) -> Self {
        ManualRegistrationAssembly { registrations }
    }

    pub fn with(mut self, qualifier: impl Into<Qualifier>, entry: RegistrationEntry) -> Self {
        self.registrations.push(ManualRegistration {
            qualifier: qualifier.into(),
            entry,
        });
        self
    }

    /// Registers all entries right away
    pub fn register_into(&self, container: &Container) -> Result<(), AssembleError> {
        for registration in &self.registrations {
            container.register(registration.qualifier.clone(), registration.entry.clone())?;
        }
        Ok(())
    }
}

impl Assembly for ManualRegistrationAssembly {
    async fn assemble(&self, container: &Container) -> Result<(), AssembleError> {
        self.register_into(container)
    }
}
