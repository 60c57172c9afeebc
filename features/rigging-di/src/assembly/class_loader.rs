use crate::{
    assembly::Assembly, container::Container, errors::AssembleError, injection::TypeRef,
};

/// Registers the declared registrations of already known types
///
/// Types without declared registrations are skipped.
#[derive(Debug, Clone, Default)]
pub struct ClassLoaderAssembly {
    types: Vec<TypeRef>,
}

impl ClassLoaderAssembly {
    pub fn new(types: Vec<TypeRef>) -> Self {
        ClassLoaderAssembly { types }
    }

    pub fn with(mut self, type_ref: TypeRef) -> Self {
        self.types.push(type_ref);
        self
    }
}

impl Assembly for ClassLoaderAssembly {
    async fn assemble(&self, container: &Container) -> Result<(), AssembleError> {
        for type_ref in &self.types {
            let entries = type_ref.registration_entries()?;
            if entries.is_empty() {
                tracing::debug!("{} declares no registrations", type_ref.info());
                continue;
            }

            for (qualifier, entry) in entries {
                container.register(qualifier, entry)?;
            }
        }
        Ok(())
    }
}
