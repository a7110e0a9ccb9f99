//! CashAssembly compiler.
//!
//! Walks the parsed node tree and emits bytecode:
//! - `OP_...` mnemonics emit their opcode byte
//! - `0x...` hex, numbers and strings emit their bytes verbatim
//! - `<...>` compiles its contents and emits the minimal push of the result
//! - identifiers resolve, in order, to a bound operation parameter, a request
//!   data parameter, a table script (spliced in place) or a table operation
//!
//! Errors never stop the walk. Every diagnostic is collected in source order
//! and the caller receives a [`CompilationResult`] either way.
//!
//! Work is bounded: every output buffer has a size cap checked after each
//! node, and the total number of expansions is capped, so tables that splice
//! scripts repeatedly fail fast instead of growing exponentially.

use crate::script::compiler::CompilerConfig;
use crate::script::diagnostic::{CompilationResult, Diagnostic, INLINE_SOURCE, SourceSpan};
use crate::script::errors::AsmError;
use crate::script::isa::byte_for_mnemonic;
use crate::script::lexer::Pos;
use crate::script::parser::{Node, NodeKind, parse};
use crate::script::push::{encode_data_push, encode_script_number};
use crate::script::table::{CompilationRequest, IdentifierTable, Target};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Script or operation body parsed once and reused across compilations.
#[derive(Debug)]
pub(crate) struct ParsedEntry {
    pub parameters: Vec<String>,
    pub nodes: Vec<Node>,
}

/// Parsed view of an [`IdentifierTable`].
#[derive(Debug, Default)]
pub(crate) struct ParsedTable {
    scripts: HashMap<String, ParsedEntry>,
    operations: HashMap<String, ParsedEntry>,
}

impl ParsedTable {
    pub(crate) fn new(table: &IdentifierTable) -> Self {
        let scripts = table
            .scripts
            .iter()
            .map(|(name, source)| {
                let entry = ParsedEntry {
                    parameters: Vec::new(),
                    nodes: parse(source),
                };
                (name.clone(), entry)
            })
            .collect();
        let operations = table
            .operations
            .iter()
            .map(|(name, op)| {
                let entry = ParsedEntry {
                    parameters: op.parameters.clone(),
                    nodes: parse(&op.body),
                };
                (name.clone(), entry)
            })
            .collect();
        Self {
            scripts,
            operations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Script,
    Operation,
}

/// Naming context for the nodes currently being emitted.
struct Scope<'s> {
    /// Script or operation name used in source spans.
    name: &'s str,
    /// Operation parameters bound to argument bytes.
    bindings: &'s HashMap<String, Vec<u8>>,
}

/// Bytes being emitted and the size they may not exceed.
struct Sink {
    bytes: Vec<u8>,
    cap: usize,
}

impl Sink {
    fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
        }
    }
}

struct Assembler<'a> {
    table: &'a ParsedTable,
    data: &'a BTreeMap<String, Vec<u8>>,
    config: &'a CompilerConfig,
    /// Scripts and operations currently being expanded, outermost first.
    expansion: Vec<(EntryKind, String)>,
    /// Expansions performed so far.
    expansions: usize,
    /// Set once the expansion budget has been reported.
    exhausted: bool,
    /// Size of the innermost sink that went over its cap, until its owner
    /// reports it.
    overflow: Option<usize>,
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
    /// Errors reported so far, duplicates included.
    reported: usize,
}

impl<'a> Assembler<'a> {
    fn new(
        table: &'a ParsedTable,
        data: &'a BTreeMap<String, Vec<u8>>,
        config: &'a CompilerConfig,
    ) -> Self {
        Self {
            table,
            data,
            config,
            expansion: Vec::new(),
            expansions: 0,
            exhausted: false,
            overflow: None,
            diagnostics: Vec::new(),
            seen: HashSet::new(),
            reported: 0,
        }
    }

    fn report(&mut self, error: AsmError, location: Option<SourceSpan>) {
        self.reported += 1;
        let diagnostic = Diagnostic::new(error, location);
        if self.seen.insert(diagnostic.clone()) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn report_at(&mut self, error: AsmError, scope: &Scope<'_>, pos: Pos) {
        self.report(error, Some(span(scope, pos)));
    }

    /// Emits `nodes` into `out`. Returns false if any error was reported.
    ///
    /// Stops early once `out` exceeds its cap; the owner of `out` takes
    /// `self.overflow` and reports it.
    fn emit(&mut self, nodes: &[Node], scope: &Scope<'_>, out: &mut Sink) -> bool {
        let before = self.reported;
        for node in nodes {
            self.emit_node(node, scope, out);
            if self.overflow.is_none() && out.bytes.len() > out.cap {
                self.overflow = Some(out.bytes.len());
            }
            if self.overflow.is_some() {
                return false;
            }
        }
        self.reported == before
    }

    fn emit_node(&mut self, node: &Node, scope: &Scope<'_>, out: &mut Sink) {
        match &node.kind {
            NodeKind::Opcode(name) => match byte_for_mnemonic(name) {
                Some(byte) => out.bytes.push(byte),
                None => self.report_at(AsmError::UnknownOpcode(name.clone()), scope, node.pos),
            },
            NodeKind::Hex(bytes) => out.bytes.extend_from_slice(bytes),
            NodeKind::Number(value) => out.bytes.extend(encode_script_number(*value)),
            NodeKind::Str(text) => out.bytes.extend_from_slice(text.as_bytes()),
            NodeKind::Push(body) => {
                let limit = self.config.max_element_size;
                let mut payload = Sink::new(limit);
                let ok = self.emit(body, scope, &mut payload);
                if let Some(size) = self.overflow.take() {
                    self.report_at(AsmError::PayloadTooLarge { size, limit }, scope, node.pos);
                } else if ok {
                    self.emit_push(&payload.bytes, scope, node.pos, out);
                }
            }
            NodeKind::Identifier(name) => self.resolve(name, scope, node.pos, out),
            NodeKind::Invoke { name, args } => {
                let callee = self.callee(name, args.len(), scope, node.pos);
                let cap = self.config.max_script_size.max(self.config.max_element_size);
                let mut values = Vec::with_capacity(args.len());
                let mut ok = true;
                for arg in args {
                    let mut value = Sink::new(cap);
                    ok &= self.emit(std::slice::from_ref(arg), scope, &mut value);
                    if let Some(size) = self.overflow.take() {
                        let error = AsmError::ScriptTooLarge { size, limit: cap };
                        self.report_at(error, scope, arg.pos);
                    }
                    values.push(value.bytes);
                }
                if let (Some(operation), true) = (callee, ok) {
                    let bindings: HashMap<String, Vec<u8>> =
                        operation.parameters.iter().cloned().zip(values).collect();
                    let site = Some(span(scope, node.pos));
                    self.expand(EntryKind::Operation, name, operation, &bindings, site, out);
                }
            }
            NodeKind::Error(error) => self.report_at(error.clone(), scope, node.pos),
        }
    }

    fn emit_push(&mut self, payload: &[u8], scope: &Scope<'_>, pos: Pos, out: &mut Sink) {
        if encode_data_push(payload, &mut out.bytes).is_none() {
            let error = AsmError::PayloadTooLarge {
                size: payload.len(),
                limit: self.config.max_element_size,
            };
            self.report_at(error, scope, pos);
        }
    }

    /// Looks up the operation invoked as `name(...)` with `argc` arguments.
    ///
    /// Reports and returns `None` if `name` is not an operation or the
    /// argument count is wrong.
    fn callee(
        &mut self,
        name: &str,
        argc: usize,
        scope: &Scope<'_>,
        pos: Pos,
    ) -> Option<&'a ParsedEntry> {
        let table = self.table;
        if scope.bindings.contains_key(name)
            || self.data.contains_key(name)
            || table.scripts.contains_key(name)
        {
            self.report_at(AsmError::NotAnOperation(name.to_string()), scope, pos);
            return None;
        }
        let Some(operation) = table.operations.get(name) else {
            self.report_at(AsmError::UnknownIdentifier(name.to_string()), scope, pos);
            return None;
        };
        if argc != operation.parameters.len() {
            let error = AsmError::ArityMismatch {
                operation: name.to_string(),
                expected: operation.parameters.len(),
                actual: argc,
            };
            self.report_at(error, scope, pos);
            return None;
        }
        Some(operation)
    }

    /// Resolves a bare identifier.
    fn resolve(&mut self, name: &str, scope: &Scope<'_>, pos: Pos, out: &mut Sink) {
        let (table, data) = (self.table, self.data);

        if let Some(bytes) = scope.bindings.get(name).or_else(|| data.get(name)) {
            out.bytes.extend_from_slice(bytes);
        } else if let Some(script) = table.scripts.get(name) {
            let site = Some(span(scope, pos));
            self.expand(EntryKind::Script, name, script, &HashMap::new(), site, out);
        } else if let Some(operation) = self.callee(name, 0, scope, pos) {
            let site = Some(span(scope, pos));
            self.expand(EntryKind::Operation, name, operation, &HashMap::new(), site, out);
        }
    }

    /// Splices a script or operation body, guarding against cycles, runaway
    /// depth and runaway expansion counts. Errors are reported at `site`.
    fn expand(
        &mut self,
        kind: EntryKind,
        name: &str,
        entry: &ParsedEntry,
        bindings: &HashMap<String, Vec<u8>>,
        site: Option<SourceSpan>,
        out: &mut Sink,
    ) {
        if let Some(start) = self
            .expansion
            .iter()
            .position(|(k, n)| *k == kind && n == name)
        {
            let mut chain: Vec<&str> = self.expansion[start..]
                .iter()
                .map(|(_, n)| n.as_str())
                .collect();
            chain.push(name);
            let chain = chain.join(" -> ");
            self.report(AsmError::CyclicReference { chain }, site);
            return;
        }

        let limit = self.config.max_expansion_depth;
        if self.expansion.len() >= limit {
            let error = AsmError::ExpansionTooDeep {
                name: name.to_string(),
                limit,
            };
            self.report(error, site);
            return;
        }

        let budget = self.config.max_expansions;
        if self.expansions >= budget {
            if !self.exhausted {
                self.exhausted = true;
                self.report(AsmError::TooManyExpansions { limit: budget }, site);
            }
            return;
        }
        self.expansions += 1;

        self.expansion.push((kind, name.to_string()));
        let inner = Scope { name, bindings };
        self.emit(&entry.nodes, &inner, out);
        self.expansion.pop();
    }
}

fn span(scope: &Scope<'_>, pos: Pos) -> SourceSpan {
    SourceSpan {
        script: scope.name.to_string(),
        line: pos.line,
        column: pos.column,
        len: pos.len.max(1),
    }
}

/// Compiles a request against an already parsed table.
pub(crate) fn compile_parsed(
    request: &CompilationRequest,
    table: &ParsedTable,
    config: &CompilerConfig,
) -> CompilationResult {
    let mut assembler = Assembler::new(table, &request.data, config);
    let no_bindings = HashMap::new();
    let mut bytecode = Sink::new(config.max_script_size);

    match &request.target {
        Target::Script(name) => match table.scripts.get(name) {
            Some(entry) => {
                assembler.expand(EntryKind::Script, name, entry, &no_bindings, None, &mut bytecode)
            }
            None => assembler.report(AsmError::ScriptNotFound(name.clone()), None),
        },
        Target::Source(source) => {
            let nodes = parse(source);
            let scope = Scope {
                name: INLINE_SOURCE,
                bindings: &no_bindings,
            };
            assembler.emit(&nodes, &scope, &mut bytecode);
        }
    }

    if let Some(size) = assembler.overflow.take() {
        let error = AsmError::ScriptTooLarge {
            size,
            limit: config.max_script_size,
        };
        assembler.report(error, None);
    }

    CompilationResult::from_parts(bytecode.bytes, assembler.diagnostics)
}

/// Compiles a request against `table` with the default configuration.
///
/// Pure: the table is only read, and the outcome (bytecode or every
/// diagnostic) is returned as a value.
pub fn compile(request: &CompilationRequest, table: &IdentifierTable) -> CompilationResult {
    compile_parsed(request, &ParsedTable::new(table), &CompilerConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::errors::Stage;
    use crate::script::table::Operation;

    fn compile_source(source: &str) -> CompilationResult {
        compile(&CompilationRequest::source(source), &IdentifierTable::new())
    }

    fn bytes(source: &str) -> Vec<u8> {
        compile_source(source).into_result().unwrap()
    }

    fn errors(result: CompilationResult) -> Vec<AsmError> {
        result.errors().iter().map(|d| d.error.clone()).collect()
    }

    #[test]
    fn assemble_empty_source() {
        assert_eq!(bytes(""), Vec::<u8>::new());
        assert_eq!(bytes("  // just a comment\n /* and a block */ "), Vec::<u8>::new());
    }

    #[test]
    fn assemble_opcodes() {
        assert_eq!(
            bytes("OP_DUP OP_HASH160 OP_EQUALVERIFY OP_CHECKSIG"),
            vec![0x76, 0xa9, 0x88, 0xac]
        );
        assert_eq!(bytes("OP_FALSE OP_TRUE OP_UNKNOWN189"), vec![0x00, 0x51, 0xbd]);
    }

    #[test]
    fn raw_literals_emit_verbatim() {
        assert_eq!(bytes("0xabcd"), vec![0xab, 0xcd]);
        assert_eq!(bytes("'ab'"), b"ab".to_vec());
        assert_eq!(bytes("-1 0 256"), vec![0x81, 0x00, 0x01]);
    }

    #[test]
    fn pushes_are_minimal() {
        assert_eq!(bytes("<0>"), vec![0x00]);
        assert_eq!(bytes("<>"), vec![0x00]);
        assert_eq!(bytes("<1> <16> <-1>"), vec![0x51, 0x60, 0x4f]);
        assert_eq!(bytes("<17>"), vec![0x01, 0x11]);
        assert_eq!(bytes("<0x01>"), vec![0x51]);
        assert_eq!(bytes("<'abc'>"), vec![0x03, b'a', b'b', b'c']);
        assert_eq!(bytes("<OP_1 OP_2>"), vec![0x02, 0x51, 0x52]);
        assert_eq!(bytes("<<0xaa>>"), vec![0x02, 0x01, 0xaa]);
    }

    #[test]
    fn push_length_classes() {
        let payload = |len: usize| format!("<0x{}>", "ab".repeat(len));
        assert_eq!(bytes(&payload(1))[0], 0x01);
        assert_eq!(bytes(&payload(75))[0], 0x4b);
        assert_eq!(&bytes(&payload(76))[..2], &[0x4c, 76]);
        assert_eq!(&bytes(&payload(255))[..2], &[0x4c, 255]);
        assert_eq!(&bytes(&payload(256))[..3], &[0x4d, 0x00, 0x01]);
    }

    #[test]
    fn oversized_push_is_encode_error() {
        let source = format!("<0x{}>", "00".repeat(521));
        let result = compile_source(&source);
        match &result {
            CompilationResult::Failure { error_type, errors } => {
                assert_eq!(*error_type, Stage::Encode);
                assert_eq!(
                    errors[0].error,
                    AsmError::PayloadTooLarge {
                        size: 521,
                        limit: 520
                    }
                );
                assert_eq!(errors[0].location.as_ref().unwrap().column, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn oversized_script_is_encode_error() {
        let source = "0x00 ".repeat(10_001);
        assert_eq!(
            errors(compile_source(&source)),
            vec![AsmError::ScriptTooLarge {
                size: 10_001,
                limit: 10_000
            }]
        );
    }

    #[test]
    fn unknown_identifiers_are_all_reported() {
        let result = compile_source("OP_1 alice OP_2 bob");
        match &result {
            CompilationResult::Failure { error_type, errors } => {
                assert_eq!(*error_type, Stage::Resolve);
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|d| d.stage() == Stage::Resolve));
                assert_eq!(
                    errors[0].error,
                    AsmError::UnknownIdentifier("alice".to_string())
                );
                assert_eq!(errors[1].error, AsmError::UnknownIdentifier("bob".to_string()));
                assert_eq!(errors[1].location.as_ref().unwrap().column, 17);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn diagnostics_keep_source_order_across_stages() {
        let result = compile_source("nobody\n0xabc OP_NOPE");
        assert_eq!(
            errors(result.clone()),
            vec![
                AsmError::UnknownIdentifier("nobody".to_string()),
                AsmError::MalformedHex {
                    literal: "0xabc".to_string(),
                    reason: crate::utils::hex::HexError::OddLength,
                },
                AsmError::UnknownOpcode("OP_NOPE".to_string()),
            ]
        );
        match result {
            CompilationResult::Failure { error_type, .. } => assert_eq!(error_type, Stage::Parse),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn data_parameters_substitute_literally() {
        let table = IdentifierTable::new();
        let request = CompilationRequest::source("OP_DUP OP_HASH160 <owner_hash> OP_EQUALVERIFY")
            .with_data("owner_hash", vec![0x11; 20]);
        let out = compile(&request, &table).into_result().unwrap();
        assert_eq!(&out[..3], &[0x76, 0xa9, 0x14]);
        assert_eq!(&out[3..23], &[0x11; 20]);
        assert_eq!(out[23], 0x88);
    }

    #[test]
    fn scripts_are_spliced_recursively() {
        let table = IdentifierTable::new()
            .with_script("check", "OP_EQUALVERIFY OP_CHECKSIG")
            .with_script("p2pkh", "OP_DUP OP_HASH160 <hash> check");
        let request = CompilationRequest::script("p2pkh").with_data("hash", vec![0x22; 20]);
        let out = compile(&request, &table).into_result().unwrap();
        assert_eq!(out.len(), 25);
        assert_eq!(&out[23..], &[0x88, 0xac]);
    }

    #[test]
    fn missing_target_script() {
        let result = compile(&CompilationRequest::script("nope"), &IdentifierTable::new());
        assert_eq!(
            result.errors(),
            &[Diagnostic::new(AsmError::ScriptNotFound("nope".to_string()), None)]
        );
    }

    #[test]
    fn cyclic_scripts_are_resolve_errors() {
        let table = IdentifierTable::new()
            .with_script("a", "OP_1 b")
            .with_script("b", "OP_2 a");
        let result = compile(&CompilationRequest::script("a"), &table);
        assert_eq!(
            errors(result),
            vec![AsmError::CyclicReference {
                chain: "a -> b -> a".to_string()
            }]
        );

        let table = IdentifierTable::new().with_script("self_ref", "self_ref");
        let result = compile(&CompilationRequest::source("self_ref"), &table);
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location.as_ref().unwrap().script, "self_ref");
    }

    #[test]
    fn expansion_depth_is_limited() {
        let mut table = IdentifierTable::new();
        for i in 0..100 {
            table = table.with_script(format!("s{i}"), format!("s{}", i + 1));
        }
        table = table.with_script("s100", "OP_1");
        let result = compile(&CompilationRequest::script("s0"), &table);
        assert!(matches!(
            errors(result).as_slice(),
            [AsmError::ExpansionTooDeep { limit: 64, .. }]
        ));
    }

    #[test]
    fn operations_bind_arguments() {
        let table = IdentifierTable::new()
            .with_operation("check", Operation::new(["key"], "<key> OP_CHECKSIG"))
            .with_operation("pair", Operation::new(["a", "b"], "<a> <b> OP_ADD"))
            .with_operation("nothing", Operation::new(Vec::<String>::new(), "OP_NOP"));

        let compile_src = |src: &str| compile(&CompilationRequest::source(src), &table);

        assert_eq!(
            compile_src("check(0xaabb)").into_result().unwrap(),
            vec![0x02, 0xaa, 0xbb, 0xac]
        );
        assert_eq!(
            compile_src("pair(2 3)").into_result().unwrap(),
            vec![0x52, 0x53, 0x93]
        );
        assert_eq!(compile_src("nothing nothing()").into_result().unwrap(), vec![0x61, 0x61]);
    }

    #[test]
    fn operation_arity_mismatch() {
        let table = IdentifierTable::new()
            .with_operation("pair", Operation::new(["a", "b"], "<a> <b>"));
        let result = compile(&CompilationRequest::source("pair(1) pair"), &table);
        assert_eq!(
            errors(result),
            vec![
                AsmError::ArityMismatch {
                    operation: "pair".to_string(),
                    expected: 2,
                    actual: 1,
                },
                AsmError::ArityMismatch {
                    operation: "pair".to_string(),
                    expected: 2,
                    actual: 0,
                },
            ]
        );
    }

    #[test]
    fn parameters_do_not_leak_into_scripts() {
        let table = IdentifierTable::new()
            .with_script("uses_key", "<key>")
            .with_operation("wrap", Operation::new(["key"], "uses_key"));
        let result = compile(&CompilationRequest::source("wrap(0x01)"), &table);
        assert_eq!(
            errors(result),
            vec![AsmError::UnknownIdentifier("key".to_string())]
        );
    }

    #[test]
    fn arguments_on_non_operations() {
        let table = IdentifierTable::new().with_script("s", "OP_1");
        let request = CompilationRequest::source("s(1) d(2)").with_data("d", vec![1]);
        assert_eq!(
            errors(compile(&request, &table)),
            vec![
                AsmError::NotAnOperation("s".to_string()),
                AsmError::NotAnOperation("d".to_string()),
            ]
        );
    }

    /// `s0` expands to 2^levels copies of `leaf`.
    fn doubling_table(levels: usize, leaf: &str) -> IdentifierTable {
        let mut table = IdentifierTable::new();
        for i in 0..levels {
            table = table.with_script(format!("s{i}"), format!("s{0} s{0}", i + 1));
        }
        table.with_script(format!("s{levels}"), leaf)
    }

    #[test]
    fn doubling_scripts_stop_at_the_script_size() {
        let table = doubling_table(48, "0x00");
        let result = compile(&CompilationRequest::script("s0"), &table);
        assert_eq!(
            result.errors(),
            &[Diagnostic::new(
                AsmError::ScriptTooLarge {
                    size: 10_001,
                    limit: 10_000
                },
                None
            )]
        );

        let result = compile(&CompilationRequest::source("OP_1 <s0>"), &table);
        assert_eq!(
            errors(result),
            vec![AsmError::PayloadTooLarge {
                size: 521,
                limit: 520
            }]
        );
    }

    #[test]
    fn doubling_empty_scripts_exhaust_the_expansion_budget() {
        let table = doubling_table(48, "// nothing");
        let result = compile(&CompilationRequest::script("s0"), &table);
        assert_eq!(
            errors(result),
            vec![AsmError::TooManyExpansions {
                limit: crate::script::compiler::MAX_EXPANSIONS
            }]
        );

        let small = CompilerConfig::default().with_max_expansions(10);
        let result = compile_parsed(
            &CompilationRequest::source("s0"),
            &ParsedTable::new(&doubling_table(4, "OP_1")),
            &small,
        );
        assert_eq!(errors(result), vec![AsmError::TooManyExpansions { limit: 10 }]);
    }

    #[test]
    fn oversized_argument_is_reported_at_the_argument() {
        let table = IdentifierTable::new()
            .with_operation("wrap", Operation::new(["v"], "v"))
            .with_script("big", &"0x00 ".repeat(10_001));
        let result = compile(&CompilationRequest::source("wrap(big)"), &table);
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error,
            AsmError::ScriptTooLarge {
                size: 10_001,
                limit: 10_000
            }
        );
        assert_eq!(errors[0].location.as_ref().unwrap().column, 6);
    }

    #[test]
    fn unknown_operation_and_unknown_argument_are_both_reported() {
        let result = compile_source("nope(missing)");
        assert_eq!(
            errors(result),
            vec![
                AsmError::UnknownIdentifier("nope".to_string()),
                AsmError::UnknownIdentifier("missing".to_string()),
            ]
        );

        let table = IdentifierTable::new()
            .with_operation("pair", Operation::new(["a", "b"], "<a> <b>"));
        let result = compile(&CompilationRequest::source("pair(ghost)"), &table);
        assert_eq!(
            errors(result),
            vec![
                AsmError::ArityMismatch {
                    operation: "pair".to_string(),
                    expected: 2,
                    actual: 1,
                },
                AsmError::UnknownIdentifier("ghost".to_string()),
            ]
        );
    }

    #[test]
    fn target_script_errors_have_no_location() {
        let table = IdentifierTable::new().with_script("lock", "OP_1");
        let result = compile_parsed(
            &CompilationRequest::script("lock"),
            &ParsedTable::new(&table),
            &CompilerConfig::default().with_max_expansion_depth(0),
        );
        assert_eq!(
            result.errors(),
            &[Diagnostic::new(
                AsmError::ExpansionTooDeep {
                    name: "lock".to_string(),
                    limit: 0
                },
                None
            )]
        );
    }

    #[test]
    fn repeated_errors_are_deduplicated_in_walk_order() {
        let source = "OP_NOPE ghost ".repeat(5_000);
        assert_eq!(
            errors(compile_source(&source)),
            vec![
                AsmError::UnknownOpcode("OP_NOPE".to_string()),
                AsmError::UnknownIdentifier("ghost".to_string()),
            ]
            .into_iter()
            .cycle()
            .take(10_000)
            .collect::<Vec<_>>()
        );

        let table = IdentifierTable::new().with_script("broken", "OP_BROKEN ghost");
        let source = "broken ".repeat(5_000);
        assert_eq!(
            errors(compile(&CompilationRequest::source(&source), &table)),
            vec![
                AsmError::UnknownOpcode("OP_BROKEN".to_string()),
                AsmError::UnknownIdentifier("ghost".to_string()),
            ]
        );
    }

    #[test]
    fn errors_inside_shared_scripts_are_reported_once() {
        let table = IdentifierTable::new().with_script("broken", "OP_BROKEN");
        let result = compile(&CompilationRequest::source("broken broken"), &table);
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].location,
            Some(SourceSpan {
                script: "broken".to_string(),
                line: 1,
                column: 1,
                len: 9,
            })
        );
    }
}
