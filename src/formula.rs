use std::collections::HashMap;
use crate::descriptor::PackageDescriptor;
use crate::error::{KegError, Result};

/// Constructor for one formula-backed package definition.
pub type FormulaFn = fn() -> PackageDescriptor;

/// Structured package definitions, keyed by the identifier derived from
/// the package name.
///
/// Definitions are registered up front as plain constructor functions;
/// there is no runtime lookup beyond the table itself.
#[derive(Debug, Default)]
pub struct FormulaSource {
    table: HashMap<String, FormulaFn>,
}

impl FormulaSource {
    pub fn new() -> Self {
        FormulaSource::default()
    }

    /// Registers a definition under the identifier derived from `name`.
    /// A later registration for the same name replaces the earlier one,
    /// keeping at most one definition per name.
    pub fn register(&mut self, name: &str, formula: FormulaFn) {
        self.table.insert(formula_ident(name), formula);
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Loads the definition for `name`, or fails with
    /// [`KegError::DefinitionNotFound`] if the derived identifier has no
    /// registered constructor.
    pub fn load(&self, name: &str) -> Result<PackageDescriptor> {
        let ident = formula_ident(name);
        match self.table.get(&ident) {
            Some(formula) => Ok(formula()),
            None => Err(KegError::DefinitionNotFound {
                name: name.to_string(),
                ident,
            }),
        }
    }
}

/// Maps a package name to its formula identifier.
///
/// Pure and total: `-`/`_` act as word boundaries (each word is
/// capitalized), and the version marker `@` becomes the literal token
/// `AT`. `python@2` -> `PythonAT2`, `libfoo-dev` -> `LibfooDev`.
pub fn formula_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    for word in name.split(['-', '_']) {
        for (i, piece) in word.split('@').enumerate() {
            if i > 0 {
                ident.push_str("AT");
            }
            let mut chars = piece.chars();
            if let Some(first) = chars.next() {
                ident.extend(first.to_uppercase());
                ident.push_str(chars.as_str());
            }
        }
    }
    ident
}
