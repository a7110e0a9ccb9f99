use crate::utils::hex::HexError;
use cashasm_derive::Error;
use std::fmt;

/// Compilation stage that produced a diagnostic.
///
/// Ordered: a failure's overall error type is the earliest stage present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Lexing and parsing of CashAssembly text.
    Parse,
    /// Identifier, opcode, script and operation resolution.
    Resolve,
    /// Push and script size encoding.
    Encode,
}

impl Stage {
    /// Returns the lowercase stage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Resolve => "resolve",
            Stage::Encode => "encode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "ParseError"),
            Stage::Resolve => write!(f, "ResolveError"),
            Stage::Encode => write!(f, "EncodeError"),
        }
    }
}

/// Errors that can occur while assembling CashAssembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum AsmError {
    // =========================
    // Parse
    // =========================
    /// String literal without its closing quote.
    #[error("unterminated string literal (missing closing {quote})")]
    UnterminatedString { quote: char },
    /// `/*` without a matching `*/`.
    #[error("unterminated block comment (missing closing */)")]
    UnterminatedComment,
    /// `<` without a matching `>`.
    #[error("unterminated push (missing closing >)")]
    UnterminatedPush,
    /// `>` without a matching `<`.
    #[error("unexpected > without matching <")]
    UnexpectedPushClose,
    /// `name(` without a matching `)`.
    #[error("unterminated argument list for {name} (missing closing ))")]
    UnterminatedArguments { name: String },
    /// `)` without a matching `name(`.
    #[error("unexpected ) without matching operation call")]
    UnexpectedArgumentsClose,
    /// `(` not preceded by an identifier.
    #[error("argument list must follow an operation name")]
    UnexpectedArgumentsOpen,
    /// Character that cannot start any token.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    /// Hex literal with odd length or non-hex digits.
    #[error("malformed hex literal {literal}: {reason}")]
    MalformedHex { literal: String, reason: HexError },
    /// Number literal that is not a valid 64-bit integer.
    #[error("malformed number literal {0}")]
    MalformedNumber(String),
    /// Word that is neither a literal, an opcode, nor a valid identifier.
    #[error("invalid identifier {0}")]
    InvalidIdentifier(String),
    /// Pushes and argument lists nested deeper than the parser allows.
    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    // =========================
    // Resolve
    // =========================
    /// `OP_` word with no matching opcode.
    #[error("unknown opcode {0}")]
    UnknownOpcode(String),
    /// Identifier not bound by any parameter, data value, script or operation.
    #[error("unknown identifier {0}")]
    UnknownIdentifier(String),
    /// Requested target script is not in the identifier table.
    #[error("script {0} not found")]
    ScriptNotFound(String),
    /// Operation invoked with the wrong number of arguments.
    #[error("operation {operation} expects {expected} argument(s) but got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },
    /// Argument list attached to something that is not an operation.
    #[error("{0} is not an operation and cannot take arguments")]
    NotAnOperation(String),
    /// Script or operation that (indirectly) references itself.
    #[error("cyclic reference: {chain}")]
    CyclicReference { chain: String },
    /// Nested expansion exceeded the configured depth.
    #[error("expansion of {name} exceeds the maximum depth of {limit}")]
    ExpansionTooDeep { name: String, limit: usize },
    /// Compilation performed more expansions than the configured budget.
    #[error("compilation exceeds the maximum of {limit} script and operation expansions")]
    TooManyExpansions { limit: usize },

    // =========================
    // Encode
    // =========================
    /// Push payload larger than the VM's maximum stack element.
    #[error("push of {size} bytes exceeds the maximum element size of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
    /// Compiled script larger than the maximum script size.
    #[error("compiled script of {size} bytes exceeds the maximum script size of {limit} bytes")]
    ScriptTooLarge { size: usize, limit: usize },
}

impl AsmError {
    /// Returns the stage this error belongs to.
    pub const fn stage(&self) -> Stage {
        match self {
            AsmError::UnterminatedString { .. }
            | AsmError::UnterminatedComment
            | AsmError::UnterminatedPush
            | AsmError::UnexpectedPushClose
            | AsmError::UnterminatedArguments { .. }
            | AsmError::UnexpectedArgumentsClose
            | AsmError::UnexpectedArgumentsOpen
            | AsmError::UnexpectedCharacter(_)
            | AsmError::MalformedHex { .. }
            | AsmError::MalformedNumber(_)
            | AsmError::InvalidIdentifier(_)
            | AsmError::NestingTooDeep { .. } => Stage::Parse,

            AsmError::UnknownOpcode(_)
            | AsmError::UnknownIdentifier(_)
            | AsmError::ScriptNotFound(_)
            | AsmError::ArityMismatch { .. }
            | AsmError::NotAnOperation(_)
            | AsmError::CyclicReference { .. }
            | AsmError::ExpansionTooDeep { .. }
            | AsmError::TooManyExpansions { .. } => Stage::Resolve,

            AsmError::PayloadTooLarge { .. } | AsmError::ScriptTooLarge { .. } => Stage::Encode,
        }
    }
}
