use crate::kind::Arity;

/// A node kind owned by a vocabulary package rather than by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionKind {
    pub package: &'static str,
    pub name: &'static str,
    pub arity: Arity,
}

/// How an extension kind appears in MathML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionForm {
    /// `<csymbol definitionURL="{namespace}{name}">`
    Csymbol,
    /// `<{name} xmlns="{namespace}"/>`
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDef {
    pub kind: ExtensionKind,
    pub namespace: &'static str,
    pub form: ExtensionForm,
}

impl ExtensionDef {
    pub fn csymbol(kind: ExtensionKind, namespace: &'static str) -> Self {
        Self {
            kind,
            namespace,
            form: ExtensionForm::Csymbol,
        }
    }

    pub fn element(kind: ExtensionKind, namespace: &'static str) -> Self {
        Self {
            kind,
            namespace,
            form: ExtensionForm::Element,
        }
    }

    pub fn definition_url(&self) -> String {
        format!("{}{}", self.namespace, self.kind.name)
    }
}

/// A bundle of extension kinds registered together.
pub trait MathPackage {
    fn name(&self) -> &'static str;
    fn definitions(&self) -> Vec<ExtensionDef>;
}

/// Read-only view of the extension vocabulary, consulted by the reader,
/// the writer and the canonicaliser.
pub trait ExtensionLookup {
    fn lookup(&self, namespace: &str, name: &str, form: ExtensionForm) -> Option<ExtensionDef>;
    fn definition(&self, kind: &ExtensionKind) -> Option<ExtensionDef>;
    fn lookup_function(&self, name: &str) -> Option<ExtensionDef>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("package `{0}` is already registered")]
    DuplicatePackage(String),
    #[error("`{namespace}{name}` is already defined by package `{package}`")]
    DuplicateDefinition {
        namespace: String,
        name: String,
        package: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    packages: Vec<&'static str>,
    definitions: Vec<ExtensionDef>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_package(&mut self, package: &dyn MathPackage) -> Result<(), RegistryError> {
        let name = package.name();
        if self.packages.contains(&name) {
            return Err(RegistryError::DuplicatePackage(name.to_string()));
        }

        let definitions = package.definitions();
        for (index, definition) in definitions.iter().enumerate() {
            let clash = self
                .definitions
                .iter()
                .chain(definitions[..index].iter())
                .find(|existing| {
                    existing.form == definition.form
                        && existing.namespace == definition.namespace
                        && existing.kind.name == definition.kind.name
                });
            if let Some(existing) = clash {
                return Err(RegistryError::DuplicateDefinition {
                    namespace: definition.namespace.to_string(),
                    name: definition.kind.name.to_string(),
                    package: existing.kind.package.to_string(),
                });
            }
        }

        self.packages.push(name);
        self.definitions.extend(definitions);
        Ok(())
    }

    pub fn packages(&self) -> &[&'static str] {
        &self.packages
    }

    pub fn definitions(&self) -> &[ExtensionDef] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ExtensionLookup for ExtensionRegistry {
    fn lookup(&self, namespace: &str, name: &str, form: ExtensionForm) -> Option<ExtensionDef> {
        self.definitions
            .iter()
            .find(|def| def.form == form && def.namespace == namespace && def.kind.name == name)
            .copied()
    }

    fn definition(&self, kind: &ExtensionKind) -> Option<ExtensionDef> {
        self.definitions
            .iter()
            .find(|def| def.kind.package == kind.package && def.kind.name == kind.name)
            .copied()
    }

    fn lookup_function(&self, name: &str) -> Option<ExtensionDef> {
        self.definitions.iter().find(|def| def.kind.name == name).copied()
    }
}

/// Splits a csymbol `definitionURL` into its namespace and local name,
/// e.g. `http://www.sbml.org/sbml/symbols/time` into
/// (`http://www.sbml.org/sbml/symbols/`, `time`).
pub fn split_definition_url(url: &str) -> (&str, &str) {
    match url.rfind(|ch| matches!(ch, '/' | '#' | ':')) {
        Some(index) => url.split_at(index + 1),
        None => ("", url),
    }
}

#[cfg(test)]
#[path = "extension_test.rs"]
mod tests;
