//! Bytecode to CashAssembly.
//!
//! Output is canonical: minimal pushes render as `<0x...>`, every other push
//! spells out its opcode and raw length prefix, so compiling the text back
//! yields the original bytes.

use crate::script::compiler::MAX_SCRIPT_ELEMENT_SIZE;
use crate::script::isa::{Opcode, is_direct_push, mnemonic_for};
use crate::script::push::PushKind;
use crate::utils::hex;

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Any non-push byte, assigned or not.
    Opcode(u8),
    /// Complete data push.
    Push {
        opcode: u8,
        /// Length prefix bytes (empty for direct pushes).
        prefix: &'a [u8],
        payload: &'a [u8],
    },
    /// Push that runs past the end of the bytecode.
    Truncated {
        opcode: u8,
        /// Bytes present after the opcode.
        read: &'a [u8],
        missing: usize,
    },
}

/// Iterator over the instructions of a bytecode slice.
pub struct Instructions<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Instructions<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Takes `len` bytes after the cursor, or everything left if short.
    fn take(&mut self, len: usize) -> Result<&'a [u8], &'a [u8]> {
        let rest = &self.bytes[self.offset..];
        if rest.len() >= len {
            self.offset += len;
            Ok(&rest[..len])
        } else {
            self.offset = self.bytes.len();
            Err(rest)
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let opcode = *self.bytes.get(self.offset)?;
        self.offset += 1;

        let prefix_len = match opcode {
            b if is_direct_push(b) => 0,
            b if b == Opcode::PushData1 as u8 => 1,
            b if b == Opcode::PushData2 as u8 => 2,
            b if b == Opcode::PushData4 as u8 => 4,
            b => return Some(Instruction::Opcode(b)),
        };

        let prefix = match self.take(prefix_len) {
            Ok(prefix) => prefix,
            Err(read) => {
                return Some(Instruction::Truncated {
                    opcode,
                    read,
                    missing: prefix_len - read.len(),
                });
            }
        };
        let payload_len = if prefix_len == 0 {
            opcode as usize
        } else {
            prefix
                .iter()
                .rev()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize)
        };

        let start = self.offset - prefix_len;
        match self.take(payload_len) {
            Ok(payload) => Some(Instruction::Push {
                opcode,
                prefix,
                payload,
            }),
            Err(rest) => Some(Instruction::Truncated {
                opcode,
                read: &self.bytes[start..start + prefix_len + rest.len()],
                missing: payload_len - rest.len(),
            }),
        }
    }
}

/// Whether `opcode` is the minimal way to push `payload`.
fn is_minimal_push(opcode: u8, payload: &[u8]) -> bool {
    match PushKind::for_payload(payload) {
        Some(PushKind::Opcode(_)) | None => false,
        Some(kind) => kind.opcode_byte(payload.len()) == opcode,
    }
}

fn render(instruction: &Instruction<'_>, max_element_size: usize, out: &mut Vec<String>) {
    match *instruction {
        Instruction::Opcode(byte) => out.push(mnemonic_for(byte).into_owned()),
        Instruction::Push {
            opcode,
            prefix,
            payload,
        } => {
            if payload.len() <= max_element_size && is_minimal_push(opcode, payload) {
                out.push(format!("<0x{}>", hex::encode(payload)));
                return;
            }
            out.push(mnemonic_for(opcode).into_owned());
            if !prefix.is_empty() {
                out.push(format!("0x{}", hex::encode(prefix)));
            }
            if !payload.is_empty() {
                out.push(format!("0x{}", hex::encode(payload)));
            }
        }
        Instruction::Truncated {
            opcode,
            read,
            missing,
        } => {
            out.push(mnemonic_for(opcode).into_owned());
            if !read.is_empty() {
                out.push(format!("0x{}", hex::encode(read)));
            }
            let unit = if missing == 1 { "byte" } else { "bytes" };
            out.push(format!("[missing {missing} {unit}]"));
        }
    }
}

/// Disassembles bytecode into canonical CashAssembly text.
///
/// Total: every byte sequence produces some output, truncated pushes included.
pub fn disassemble(bytecode: &[u8]) -> String {
    disassemble_with_limit(bytecode, MAX_SCRIPT_ELEMENT_SIZE)
}

/// Same as [`disassemble`], with pushes larger than `max_element_size`
/// rendered in explicit form.
pub fn disassemble_with_limit(bytecode: &[u8], max_element_size: usize) -> String {
    let mut tokens = Vec::new();
    for instruction in Instructions::new(bytecode) {
        render(&instruction, max_element_size, &mut tokens);
    }
    tokens.join(" ")
}
