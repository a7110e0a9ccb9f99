//! CashAssembly library.
//!
//! Compiles CashAssembly text to Bitcoin Cash script bytecode and back.

pub mod script;
pub mod utils;

pub use script::assembler::compile;
pub use script::compiler::{Compiler, CompilerConfig};
pub use script::diagnostic::{CompilationResult, CompileFailure, Diagnostic};
pub use script::disassembler::disassemble;
pub use script::errors::{AsmError, Stage};
pub use script::table::{CompilationRequest, IdentifierTable, Operation, Target};
