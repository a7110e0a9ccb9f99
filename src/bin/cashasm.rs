//! CashAssembly command-line tool.
//!
//! Compiles CashAssembly files to Bitcoin Cash script bytecode and
//! disassembles bytecode back to text.
//!
//! # Usage
//! ```text
//! cashasm compile <input.cash> [OPTIONS]
//! cashasm disassemble <file | 0xhex>
//! ```
//!
//! # Compile options
//! - `-o, --output <file>`: Write raw bytecode to a file instead of printing hex
//! - `-s, --script <name>=<file>`: Make a named script available to the input
//! - `-d, --data <name>=<0xhex>`: Bind a data parameter
//! - `--max-element-size <n>`: Largest push payload (default 520)
//! - `--max-script-size <n>`: Largest compiled script (default 10000)
//! - `-q, --quiet`: Only log errors
//!
//! # Examples
//! ```text
//! cashasm compile p2pkh.cash -d owner_hash=0x89abcdefabbaabbaabbaabbaabbaabbaabbaabba
//! cashasm compile wallet.cash -s check=check.cash -o wallet.bin
//! cashasm disassemble 0x76a988ac
//! ```

use cashasm::script::compiler::{Compiler, CompilerConfig};
use cashasm::script::diagnostic::{CompilationResult, INLINE_SOURCE, render_diagnostic};
use cashasm::script::table::{CompilationRequest, IdentifierTable};
use cashasm::utils::hex::{self, HexError};
use cashasm::utils::log::{Level, set_min_level};
use cashasm::{disassemble, error, info};
use cashasm_derive::Error;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;

/// Errors raised while handling command-line input.
#[derive(Debug, Error)]
enum CliError {
    #[error("{flag} requires an argument")]
    MissingValue { flag: String },
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("expected <name>=<value>, got '{0}'")]
    MalformedBinding(String),
    #[error("invalid hex for {name}: {reason}")]
    InvalidHex { name: String, reason: HexError },
    #[error("invalid number for {flag}: '{value}'")]
    InvalidNumber { flag: String, value: String },
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("compilation failed with {0} error(s)")]
    Compilation(usize),
}

/// Parsed `compile` subcommand.
#[derive(Debug, Default, PartialEq, Eq)]
struct CompileArgs {
    input: String,
    output: Option<String>,
    scripts: Vec<(String, String)>,
    data: Vec<(String, Vec<u8>)>,
    config: CompilerConfig,
    quiet: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let help = args.len() > 1 && (args[1] == "--help" || args[1] == "-h");
    if args.len() < 3 || help {
        print_usage(&args[0]);
        process::exit(if help { 0 } else { 1 });
    }

    let result = match args[1].as_str() {
        "compile" => parse_compile_args(&args[2..]).and_then(|parsed| {
            if parsed.quiet {
                set_min_level(Level::Error);
            }
            run_compile(&parsed)
        }),
        "disassemble" => run_disassemble(&args[2]),
        other => Err(CliError::UnexpectedArgument(other.to_string())),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

fn parse_compile_args(args: &[String]) -> Result<CompileArgs, CliError> {
    let mut parsed = CompileArgs::default();
    let mut input = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i).cloned().ok_or_else(|| CliError::MissingValue {
                flag: flag.to_string(),
            })
        };
        match flag {
            "--output" | "-o" => parsed.output = Some(value()?),
            "--script" | "-s" => parsed.scripts.push(parse_binding(&value()?)?),
            "--data" | "-d" => {
                let (name, raw) = parse_binding(&value()?)?;
                let digits = raw.strip_prefix("0x").unwrap_or(&raw);
                let bytes = hex::decode(digits).map_err(|reason| CliError::InvalidHex {
                    name: name.clone(),
                    reason,
                })?;
                parsed.data.push((name, bytes));
            }
            "--max-element-size" => {
                parsed.config = parsed.config.with_max_element_size(parse_limit(flag, &value()?)?)
            }
            "--max-script-size" => {
                parsed.config = parsed.config.with_max_script_size(parse_limit(flag, &value()?)?)
            }
            "--quiet" | "-q" => parsed.quiet = true,
            other if input.is_none() && !other.starts_with('-') => {
                input = Some(other.to_string())
            }
            other => return Err(CliError::UnexpectedArgument(other.to_string())),
        }
        i += 1;
    }

    parsed.input = input.ok_or_else(|| CliError::MissingValue {
        flag: "compile".to_string(),
    })?;
    Ok(parsed)
}

/// Splits `name=value`.
fn parse_binding(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(CliError::MalformedBinding(raw.to_string())),
    }
}

fn parse_limit(flag: &str, value: &str) -> Result<usize, CliError> {
    value.parse().map_err(|_| CliError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

fn read_text(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

fn run_compile(args: &CompileArgs) -> Result<(), CliError> {
    let source = read_text(&args.input)?;

    let mut table = IdentifierTable::new();
    for (name, path) in &args.scripts {
        table = table.with_script(name.clone(), read_text(path)?);
    }
    let compiler = Compiler::with_config(table, args.config);

    let mut request = CompilationRequest::source(source.clone());
    for (name, bytes) in &args.data {
        request = request.with_data(name.clone(), bytes.clone());
    }

    let bytecode = match compiler.compile(&request) {
        CompilationResult::Success { bytecode } => bytecode,
        CompilationResult::Failure { errors, .. } => {
            for diagnostic in &errors {
                let text = match diagnostic.location.as_ref().map(|l| l.script.as_str()) {
                    Some(INLINE_SOURCE) => Some(source.as_str()),
                    Some(name) => compiler.table().script(name),
                    None => None,
                };
                eprintln!("{}", render_diagnostic(diagnostic, text));
            }
            return Err(CliError::Compilation(errors.len()));
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &bytecode).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!(
                "Compiled {} -> {} ({} bytes)",
                args.input,
                path,
                bytecode.len()
            );
        }
        None => {
            println!("{}", hex::encode(&bytecode));
            info!("Compiled {} ({} bytes)", args.input, bytecode.len());
        }
    }
    Ok(())
}

fn run_disassemble(input: &str) -> Result<(), CliError> {
    let bytecode = match input.strip_prefix("0x") {
        Some(digits) if !Path::new(input).exists() => {
            decode_hex_arg(digits).map_err(|reason| CliError::InvalidHex {
                name: input.to_string(),
                reason,
            })?
        }
        _ => fs::read(input).map_err(|source| CliError::Read {
            path: input.to_string(),
            source,
        })?,
    };
    println!("{}", disassemble(&bytecode));
    Ok(())
}

/// Decodes hex typed on the command line, ignoring whitespace between digits.
fn decode_hex_arg(digits: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = digits.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits)
}

const USAGE: &str = "\
CashAssembly Compiler

USAGE:
    {program} compile <input.cash> [OPTIONS]
    {program} disassemble <file | 0xhex>

COMPILE OPTIONS:
    -o, --output <file>           Write raw bytecode to a file instead of printing hex
    -s, --script <name>=<file>    Make a named script available to the input
    -d, --data <name>=<0xhex>     Bind a data parameter
        --max-element-size <n>    Largest push payload (default 520)
        --max-script-size <n>     Largest compiled script (default 10000)
    -q, --quiet                   Only log errors
    -h, --help                    Print this help message

EXAMPLES:
    # Compile and print hex
    {program} compile p2pkh.cash -d owner_hash=0x89abcdefabbaabbaabbaabbaabbaabbaabbaabba

    # Compile with a helper script, write binary output
    {program} compile wallet.cash -s check=check.cash -o wallet.bin

    # Disassemble hex bytecode
    {program} disassemble 0x76a988ac
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn compile_args() {
        let parsed = parse_compile_args(&args(&[
            "lock.cash",
            "-o",
            "lock.bin",
            "-s",
            "check=check.cash",
            "-d",
            "owner=0xaabb",
            "--max-script-size",
            "200",
        ]))
        .unwrap();
        assert_eq!(parsed.input, "lock.cash");
        assert_eq!(parsed.output.as_deref(), Some("lock.bin"));
        assert_eq!(
            parsed.scripts,
            vec![("check".to_string(), "check.cash".to_string())]
        );
        assert_eq!(parsed.data, vec![("owner".to_string(), vec![0xaa, 0xbb])]);
        assert_eq!(parsed.config.max_script_size, 200);
        assert_eq!(parsed.config.max_element_size, 520);
    }

    #[test]
    fn hex_arguments_ignore_whitespace() {
        assert_eq!(decode_hex_arg("76 a9\n88ac").unwrap(), vec![0x76, 0xa9, 0x88, 0xac]);
        assert_eq!(decode_hex_arg("\t").unwrap(), Vec::<u8>::new());
        assert!(decode_hex_arg("7 6a").is_ok());
        assert!(matches!(decode_hex_arg("76 a"), Err(HexError::OddLength)));
    }

    #[test]
    fn compile_args_errors() {
        assert!(matches!(
            parse_compile_args(&args(&["a.cash", "-o"])),
            Err(CliError::MissingValue { .. })
        ));
        assert!(matches!(
            parse_compile_args(&args(&["a.cash", "-d", "owner"])),
            Err(CliError::MalformedBinding(_))
        ));
        assert!(matches!(
            parse_compile_args(&args(&["a.cash", "-d", "owner=0xzz"])),
            Err(CliError::InvalidHex { .. })
        ));
        assert!(matches!(
            parse_compile_args(&args(&["a.cash", "b.cash"])),
            Err(CliError::UnexpectedArgument(_))
        ));
        assert!(matches!(
            parse_compile_args(&args(&["--max-element-size", "big", "a.cash"])),
            Err(CliError::InvalidNumber { .. })
        ));
    }
}
