//! Canonical push-data and script number encoding.
//!
//! Every payload has exactly one minimal push form, chosen by its length
//! (and, for single bytes, its value). Two programs pushing the same data
//! therefore always produce identical bytecode.

use crate::script::isa::{MAX_DIRECT_PUSH, Opcode};

/// Minimal encoding class of a push payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// Payload represented by a single opcode (`OP_0`, `OP_1NEGATE`, `OP_1..OP_16`).
    Opcode(Opcode),
    /// 1 to 75 bytes, length is the opcode itself.
    Direct,
    /// Up to 255 bytes behind `OP_PUSHDATA1`.
    PushData1,
    /// Up to 65535 bytes behind `OP_PUSHDATA2`.
    PushData2,
    /// Up to `u32::MAX` bytes behind `OP_PUSHDATA4`.
    PushData4,
}

impl PushKind {
    /// Determines the minimal push form for `payload`.
    ///
    /// Returns `None` only when the payload cannot be pushed at all.
    pub fn for_payload(payload: &[u8]) -> Option<Self> {
        let kind = match payload {
            [] => PushKind::Opcode(Opcode::Op0),
            [0x81] => PushKind::Opcode(Opcode::Op1Negate),
            [n @ 1..=16] => PushKind::Opcode(small_int_opcode(*n)),
            _ if payload.len() <= MAX_DIRECT_PUSH => PushKind::Direct,
            _ if payload.len() <= u8::MAX as usize => PushKind::PushData1,
            _ if payload.len() <= u16::MAX as usize => PushKind::PushData2,
            _ if payload.len() as u64 <= u32::MAX as u64 => PushKind::PushData4,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the first byte of the encoded push.
    pub fn opcode_byte(&self, payload_len: usize) -> u8 {
        match self {
            PushKind::Opcode(op) => *op as u8,
            PushKind::Direct => payload_len as u8,
            PushKind::PushData1 => Opcode::PushData1 as u8,
            PushKind::PushData2 => Opcode::PushData2 as u8,
            PushKind::PushData4 => Opcode::PushData4 as u8,
        }
    }

    /// Returns the encoded size (opcode, length prefix, payload).
    pub fn encoded_len(&self, payload_len: usize) -> usize {
        match self {
            PushKind::Opcode(_) => 1,
            PushKind::Direct => 1 + payload_len,
            PushKind::PushData1 => 2 + payload_len,
            PushKind::PushData2 => 3 + payload_len,
            PushKind::PushData4 => 5 + payload_len,
        }
    }
}

/// Maps `1..=16` to `OP_1..OP_16`.
fn small_int_opcode(n: u8) -> Opcode {
    match Opcode::from_byte(Opcode::Op1 as u8 + n - 1) {
        Some(op) => op,
        None => unreachable!("OP_1..OP_16 are contiguous"),
    }
}

/// Appends the minimal push of `payload` to `out`.
///
/// Returns the push kind used, or `None` (writing nothing) if the payload
/// exceeds every push form.
pub fn encode_data_push(payload: &[u8], out: &mut Vec<u8>) -> Option<PushKind> {
    let kind = PushKind::for_payload(payload)?;
    out.reserve(kind.encoded_len(payload.len()));
    out.push(kind.opcode_byte(payload.len()));
    match kind {
        PushKind::Opcode(_) => return Some(kind),
        PushKind::Direct => {}
        PushKind::PushData1 => out.push(payload.len() as u8),
        PushKind::PushData2 => out.extend_from_slice(&(payload.len() as u16).to_le_bytes()),
        PushKind::PushData4 => out.extend_from_slice(&(payload.len() as u32).to_le_bytes()),
    }
    out.extend_from_slice(payload);
    Some(kind)
}

/// Encodes an integer as a minimal script number.
///
/// Little-endian magnitude with the sign in the high bit of the last byte;
/// zero is the empty array.
pub fn encode_script_number(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while magnitude > 0 {
        out.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // Sign bit collision: add a byte to carry it.
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}
