use std::path::PathBuf;
use crate::descriptor::PackageDescriptor;
use crate::error::{KegError, Result};
use crate::formula::FormulaSource;
use crate::registry::Registry;

/// Turns a package name into a [`PackageDescriptor`].
///
/// Two backing sources are consulted in order: the formula table (which
/// may carry install steps) and the flat registry file. Resolution is
/// read-only; it performs no network access and no filesystem mutation.
#[derive(Debug)]
pub struct Resolver {
    formulas: FormulaSource,
    registry_path: PathBuf,
}

impl Resolver {
    pub fn new(formulas: FormulaSource, registry_path: PathBuf) -> Self {
        Resolver {
            formulas,
            registry_path,
        }
    }

    /// # Errors
    ///
    /// [`KegError::NotFound`] if neither source defines `name`. A
    /// missing or unparsable registry only surfaces when the formula
    /// table has no definition either and the registry is the last
    /// hope for `name`.
    pub fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        match self.formulas.load(name) {
            Ok(descriptor) => return Ok(descriptor),
            Err(KegError::DefinitionNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        if self.registry_path.exists() {
            let registry = Registry::load(&self.registry_path)?;
            if let Some(descriptor) = registry.descriptor(name) {
                return Ok(descriptor);
            }
        }
        Err(KegError::NotFound {
            name: name.to_string(),
        })
    }
}
