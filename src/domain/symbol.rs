// Symbol identities and source positions.

use std::fmt;

/// A resolved function identity: the module that declares it plus its name.
///
/// `package` is `None` for universe-scope functions (prelude functions,
/// associated functions of primitive types), which have no declaring module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub package: Option<String>,
    pub name: String,
}

impl Symbol {
    pub fn in_package(package: impl Into<String>, name: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            package: (!package.is_empty()).then_some(package),
            name: name.into(),
        }
    }

    pub fn universe(name: impl Into<String>) -> Self {
        Self {
            package: None,
            name: name.into(),
        }
    }

    /// `<package-path>.<name>`, or the bare name when there is no package.
    ///
    /// Callers and callees both go through this, so one function always maps
    /// to one graph node.
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Splits a qualified name back into package and name.
pub fn split_qualified(qualified: &str) -> (Option<&str>, &str) {
    match qualified.rsplit_once('.') {
        Some((package, name)) => (Some(package), name),
        None => (None, qualified),
    }
}

/// A call-site location. Line and column are both 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
