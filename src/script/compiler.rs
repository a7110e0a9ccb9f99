//! Compiler service.
//!
//! [`Compiler`] owns an [`IdentifierTable`] and a [`CompilerConfig`]. The
//! table is parsed on first use and the parse is shared by every later call,
//! from any thread.

use crate::script::assembler::{ParsedTable, compile_parsed};
use crate::script::diagnostic::CompilationResult;
use crate::script::disassembler::disassemble_with_limit;
use crate::script::table::{CompilationRequest, IdentifierTable};
use std::sync::OnceLock;

/// Largest payload a single push may carry.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Largest compiled script, in bytes.
pub const MAX_SCRIPT_SIZE: usize = 10_000;
/// Deepest chain of nested script and operation expansions.
pub const MAX_EXPANSION_DEPTH: usize = 64;
/// Most script and operation expansions a single compilation may perform.
pub const MAX_EXPANSIONS: usize = 100_000;

/// Limits applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    pub max_element_size: usize,
    pub max_script_size: usize,
    pub max_expansion_depth: usize,
    pub max_expansions: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_element_size: MAX_SCRIPT_ELEMENT_SIZE,
            max_script_size: MAX_SCRIPT_SIZE,
            max_expansion_depth: MAX_EXPANSION_DEPTH,
            max_expansions: MAX_EXPANSIONS,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_element_size(mut self, size: usize) -> Self {
        self.max_element_size = size;
        self
    }

    pub fn with_max_script_size(mut self, size: usize) -> Self {
        self.max_script_size = size;
        self
    }

    pub fn with_max_expansion_depth(mut self, depth: usize) -> Self {
        self.max_expansion_depth = depth;
        self
    }

    pub fn with_max_expansions(mut self, count: usize) -> Self {
        self.max_expansions = count;
        self
    }
}

/// Compiles requests against a fixed identifier table.
#[derive(Debug, Default)]
pub struct Compiler {
    table: IdentifierTable,
    config: CompilerConfig,
    parsed: OnceLock<ParsedTable>,
}

impl Compiler {
    /// Creates a compiler with the default limits.
    pub fn new(table: IdentifierTable) -> Self {
        Self::with_config(table, CompilerConfig::default())
    }

    pub fn with_config(table: IdentifierTable, config: CompilerConfig) -> Self {
        Self {
            table,
            config,
            parsed: OnceLock::new(),
        }
    }

    pub fn table(&self) -> &IdentifierTable {
        &self.table
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn parsed(&self) -> &ParsedTable {
        self.parsed.get_or_init(|| ParsedTable::new(&self.table))
    }

    /// Compiles a request. Never fails outright: errors come back as a
    /// [`CompilationResult::Failure`].
    pub fn compile(&self, request: &CompilationRequest) -> CompilationResult {
        compile_parsed(request, self.parsed(), &self.config)
    }

    /// Compiles inline source with no data parameters.
    pub fn compile_source(&self, source: &str) -> CompilationResult {
        self.compile(&CompilationRequest::source(source))
    }

    /// Compiles a table script by name with no data parameters.
    pub fn compile_script(&self, name: &str) -> CompilationResult {
        self.compile(&CompilationRequest::script(name))
    }

    /// Disassembles bytecode using this compiler's element size limit.
    pub fn disassemble(&self, bytecode: &[u8]) -> String {
        disassemble_with_limit(bytecode, self.config.max_element_size)
    }
}
