//! CashAssembly assembler and disassembler for Bitcoin Cash script bytecode.
//!
//! Compilation takes a [`table::CompilationRequest`] (a named script or inline
//! source, plus data parameters) and an [`table::IdentifierTable`] of named
//! scripts and operations, and returns a [`diagnostic::CompilationResult`]:
//! either the bytecode or every diagnostic found, in source order.
//!
//! # Pipeline
//!
//! - **Lexing**: comments stripped, text split into words, strings and brackets
//! - **Parsing**: pushes (`<...>`) and operation calls (`name(...)`) nested into a tree
//! - **Assembly**: identifiers resolved, pushes minimally encoded, limits checked
//!
//! Disassembly is the inverse: any byte sequence renders as canonical text
//! that compiles back to the same bytes.
//!
//! # Modules
//!
//! - [`assembler`]: Tree walk, identifier resolution and bytecode emission
//! - [`compiler`]: Reusable compiler service and its limits
//! - [`diagnostic`]: Diagnostics, compilation results and error rendering
//! - [`disassembler`]: Bytecode decoding and canonical text output
//! - [`errors`]: Error kinds and their stages
//! - [`isa`]: Opcode table and mnemonic mappings
//! - [`push`]: Minimal push and script number encoding
//! - [`table`]: Identifier tables and compilation requests

pub mod assembler;
pub mod compiler;
pub mod diagnostic;
pub mod disassembler;
pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
mod lexer;
mod parser;
pub mod push;
pub mod table;
