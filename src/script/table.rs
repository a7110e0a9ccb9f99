//! Identifier tables and compilation requests.

use std::collections::BTreeMap;

/// Parameterized CashAssembly fragment invoked as `name(arg ...)`.
///
/// Inside `body`, each parameter name resolves to the compiled bytes of the
/// corresponding argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    /// Parameter names, in argument order.
    pub parameters: Vec<String>,
    /// CashAssembly source evaluated on invocation.
    pub body: String,
}

impl Operation {
    /// Creates an operation from its parameter names and body.
    pub fn new<I, S>(parameters: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            body: body.into(),
        }
    }

    /// Returns the number of arguments this operation expects.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Named scripts and operations available to a compilation.
///
/// Owned by the caller and only ever borrowed immutably while compiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierTable {
    /// Script name to CashAssembly source.
    pub scripts: BTreeMap<String, String>,
    /// Operation name to definition.
    pub operations: BTreeMap<String, Operation>,
}

impl IdentifierTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a named script.
    pub fn with_script(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), source.into());
        self
    }

    /// Adds (or replaces) a named operation.
    pub fn with_operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// Returns the source of a named script.
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}

/// What a [`CompilationRequest`] compiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A script from the identifier table, by name.
    Script(String),
    /// Inline CashAssembly source.
    Source(String),
}

/// Target script plus data parameters for literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    pub target: Target,
    /// Data parameter name to the bytes substituted for it.
    pub data: BTreeMap<String, Vec<u8>>,
}

impl CompilationRequest {
    /// Requests compilation of a named script from the table.
    pub fn script(name: impl Into<String>) -> Self {
        Self {
            target: Target::Script(name.into()),
            data: BTreeMap::new(),
        }
    }

    /// Requests compilation of inline source text.
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            target: Target::Source(source.into()),
            data: BTreeMap::new(),
        }
    }

    /// Binds a data parameter.
    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }
}
