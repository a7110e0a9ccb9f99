//! Bitcoin Cash opcode table.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode definitions and invokes a callback macro for code generation, so the
//! table is written exactly once.
//!
//! This module generates:
//! - The [`Opcode`] enum with byte mappings
//! - [`Opcode::from_byte`], [`Opcode::mnemonic`] and [`Opcode::from_mnemonic`]
//!
//! Bytes `0x01..=0x4b` are direct pushes (`OP_PUSHBYTES_n`) and are not part of
//! the enum; neither are unassigned bytes, which render as `OP_UNKNOWNn`.
//!
//! # Bytecode Format
//!
//! - Opcode: 1 byte
//! - Direct push: length byte `0x01..=0x4b` followed by that many bytes
//! - `OP_PUSHDATA1/2/4`: opcode, 1/2/4-byte little-endian length, payload

use std::borrow::Cow;

/// Largest payload a direct push (`OP_PUSHBYTES_n`) can carry.
pub const MAX_DIRECT_PUSH: usize = 0x4b;

/// Invokes a callback macro with the complete opcode definition list.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Stack pushes
            // =========================
            /// OP_0 ; push an empty byte array
            Op0 = 0x00, "OP_0",
            /// OP_PUSHDATA1 ; push N bytes, N read as 1-byte length
            PushData1 = 0x4C, "OP_PUSHDATA1",
            /// OP_PUSHDATA2 ; push N bytes, N read as 2-byte little-endian length
            PushData2 = 0x4D, "OP_PUSHDATA2",
            /// OP_PUSHDATA4 ; push N bytes, N read as 4-byte little-endian length
            PushData4 = 0x4E, "OP_PUSHDATA4",
            /// OP_1NEGATE ; push the number -1
            Op1Negate = 0x4F, "OP_1NEGATE",
            /// OP_RESERVED ; fails the script unless in an unexecuted branch
            Reserved = 0x50, "OP_RESERVED",
            /// OP_1 ; push the number 1
            Op1 = 0x51, "OP_1",
            /// OP_2 ; push the number 2
            Op2 = 0x52, "OP_2",
            /// OP_3 ; push the number 3
            Op3 = 0x53, "OP_3",
            /// OP_4 ; push the number 4
            Op4 = 0x54, "OP_4",
            /// OP_5 ; push the number 5
            Op5 = 0x55, "OP_5",
            /// OP_6 ; push the number 6
            Op6 = 0x56, "OP_6",
            /// OP_7 ; push the number 7
            Op7 = 0x57, "OP_7",
            /// OP_8 ; push the number 8
            Op8 = 0x58, "OP_8",
            /// OP_9 ; push the number 9
            Op9 = 0x59, "OP_9",
            /// OP_10 ; push the number 10
            Op10 = 0x5A, "OP_10",
            /// OP_11 ; push the number 11
            Op11 = 0x5B, "OP_11",
            /// OP_12 ; push the number 12
            Op12 = 0x5C, "OP_12",
            /// OP_13 ; push the number 13
            Op13 = 0x5D, "OP_13",
            /// OP_14 ; push the number 14
            Op14 = 0x5E, "OP_14",
            /// OP_15 ; push the number 15
            Op15 = 0x5F, "OP_15",
            /// OP_16 ; push the number 16
            Op16 = 0x60, "OP_16",
            // =========================
            // Flow control
            // =========================
            /// OP_NOP ; does nothing
            Nop = 0x61, "OP_NOP",
            /// OP_VER ; fails the script unless in an unexecuted branch
            Ver = 0x62, "OP_VER",
            /// OP_IF ; execute the branch if the top item is truthy
            If = 0x63, "OP_IF",
            /// OP_NOTIF ; execute the branch if the top item is falsy
            NotIf = 0x64, "OP_NOTIF",
            /// OP_VERIF ; always fails the script
            VerIf = 0x65, "OP_VERIF",
            /// OP_VERNOTIF ; always fails the script
            VerNotIf = 0x66, "OP_VERNOTIF",
            /// OP_ELSE ; toggle execution of the current branch
            Else = 0x67, "OP_ELSE",
            /// OP_ENDIF ; close the current branch
            EndIf = 0x68, "OP_ENDIF",
            /// OP_VERIFY ; fail unless the top item is truthy
            Verify = 0x69, "OP_VERIFY",
            /// OP_RETURN ; fail the script immediately
            Return = 0x6A, "OP_RETURN",
            // =========================
            // Stack operations
            // =========================
            /// OP_TOALTSTACK ; move the top item to the alt stack
            ToAltStack = 0x6B, "OP_TOALTSTACK",
            /// OP_FROMALTSTACK ; move the top alt stack item to the stack
            FromAltStack = 0x6C, "OP_FROMALTSTACK",
            /// OP_2DROP ; drop the top two items
            TwoDrop = 0x6D, "OP_2DROP",
            /// OP_2DUP ; duplicate the top two items
            TwoDup = 0x6E, "OP_2DUP",
            /// OP_3DUP ; duplicate the top three items
            ThreeDup = 0x6F, "OP_3DUP",
            /// OP_2OVER ; copy the third and fourth items to the top
            TwoOver = 0x70, "OP_2OVER",
            /// OP_2ROT ; move the fifth and sixth items to the top
            TwoRot = 0x71, "OP_2ROT",
            /// OP_2SWAP ; swap the top two pairs
            TwoSwap = 0x72, "OP_2SWAP",
            /// OP_IFDUP ; duplicate the top item if truthy
            IfDup = 0x73, "OP_IFDUP",
            /// OP_DEPTH ; push the stack depth
            Depth = 0x74, "OP_DEPTH",
            /// OP_DROP ; drop the top item
            Drop = 0x75, "OP_DROP",
            /// OP_DUP ; duplicate the top item
            Dup = 0x76, "OP_DUP",
            /// OP_NIP ; drop the second item
            Nip = 0x77, "OP_NIP",
            /// OP_OVER ; copy the second item to the top
            Over = 0x78, "OP_OVER",
            /// OP_PICK ; copy the Nth item to the top
            Pick = 0x79, "OP_PICK",
            /// OP_ROLL ; move the Nth item to the top
            Roll = 0x7A, "OP_ROLL",
            /// OP_ROT ; rotate the top three items
            Rot = 0x7B, "OP_ROT",
            /// OP_SWAP ; swap the top two items
            Swap = 0x7C, "OP_SWAP",
            /// OP_TUCK ; copy the top item below the second
            Tuck = 0x7D, "OP_TUCK",
            // =========================
            // Splice
            // =========================
            /// OP_CAT ; concatenate the top two items
            Cat = 0x7E, "OP_CAT",
            /// OP_SPLIT ; split an item at position N
            Split = 0x7F, "OP_SPLIT",
            /// OP_NUM2BIN ; pad a number to N bytes
            Num2Bin = 0x80, "OP_NUM2BIN",
            /// OP_BIN2NUM ; minimally encode a number
            Bin2Num = 0x81, "OP_BIN2NUM",
            /// OP_SIZE ; push the byte length of the top item
            Size = 0x82, "OP_SIZE",
            // =========================
            // Bitwise logic
            // =========================
            /// OP_INVERT ; flip every bit of the top item
            Invert = 0x83, "OP_INVERT",
            /// OP_AND ; bitwise and of equal-length items
            And = 0x84, "OP_AND",
            /// OP_OR ; bitwise or of equal-length items
            Or = 0x85, "OP_OR",
            /// OP_XOR ; bitwise xor of equal-length items
            Xor = 0x86, "OP_XOR",
            /// OP_EQUAL ; push whether the top two items are equal
            Equal = 0x87, "OP_EQUAL",
            /// OP_EQUALVERIFY ; OP_EQUAL then OP_VERIFY
            EqualVerify = 0x88, "OP_EQUALVERIFY",
            /// OP_RESERVED1 ; fails the script unless in an unexecuted branch
            Reserved1 = 0x89, "OP_RESERVED1",
            /// OP_RESERVED2 ; fails the script unless in an unexecuted branch
            Reserved2 = 0x8A, "OP_RESERVED2",
            // =========================
            // Arithmetic
            // =========================
            /// OP_1ADD ; add 1
            OneAdd = 0x8B, "OP_1ADD",
            /// OP_1SUB ; subtract 1
            OneSub = 0x8C, "OP_1SUB",
            /// OP_2MUL ; disabled
            TwoMul = 0x8D, "OP_2MUL",
            /// OP_2DIV ; disabled
            TwoDiv = 0x8E, "OP_2DIV",
            /// OP_NEGATE ; negate
            Negate = 0x8F, "OP_NEGATE",
            /// OP_ABS ; absolute value
            Abs = 0x90, "OP_ABS",
            /// OP_NOT ; push 1 if the top item is 0, else 0
            Not = 0x91, "OP_NOT",
            /// OP_0NOTEQUAL ; push 0 if the top item is 0, else 1
            ZeroNotEqual = 0x92, "OP_0NOTEQUAL",
            /// OP_ADD ; a + b
            Add = 0x93, "OP_ADD",
            /// OP_SUB ; a - b
            Sub = 0x94, "OP_SUB",
            /// OP_MUL ; a * b
            Mul = 0x95, "OP_MUL",
            /// OP_DIV ; a / b
            Div = 0x96, "OP_DIV",
            /// OP_MOD ; a % b
            Mod = 0x97, "OP_MOD",
            /// OP_LSHIFT ; disabled
            LShift = 0x98, "OP_LSHIFT",
            /// OP_RSHIFT ; disabled
            RShift = 0x99, "OP_RSHIFT",
            /// OP_BOOLAND ; a && b
            BoolAnd = 0x9A, "OP_BOOLAND",
            /// OP_BOOLOR ; a || b
            BoolOr = 0x9B, "OP_BOOLOR",
            /// OP_NUMEQUAL ; a == b
            NumEqual = 0x9C, "OP_NUMEQUAL",
            /// OP_NUMEQUALVERIFY ; OP_NUMEQUAL then OP_VERIFY
            NumEqualVerify = 0x9D, "OP_NUMEQUALVERIFY",
            /// OP_NUMNOTEQUAL ; a != b
            NumNotEqual = 0x9E, "OP_NUMNOTEQUAL",
            /// OP_LESSTHAN ; a < b
            LessThan = 0x9F, "OP_LESSTHAN",
            /// OP_GREATERTHAN ; a > b
            GreaterThan = 0xA0, "OP_GREATERTHAN",
            /// OP_LESSTHANOREQUAL ; a <= b
            LessThanOrEqual = 0xA1, "OP_LESSTHANOREQUAL",
            /// OP_GREATERTHANOREQUAL ; a >= b
            GreaterThanOrEqual = 0xA2, "OP_GREATERTHANOREQUAL",
            /// OP_MIN ; min(a, b)
            Min = 0xA3, "OP_MIN",
            /// OP_MAX ; max(a, b)
            Max = 0xA4, "OP_MAX",
            /// OP_WITHIN ; min <= x < max
            Within = 0xA5, "OP_WITHIN",
            // =========================
            // Crypto
            // =========================
            /// OP_RIPEMD160 ; RIPEMD-160 of the top item
            Ripemd160 = 0xA6, "OP_RIPEMD160",
            /// OP_SHA1 ; SHA-1 of the top item
            Sha1 = 0xA7, "OP_SHA1",
            /// OP_SHA256 ; SHA-256 of the top item
            Sha256 = 0xA8, "OP_SHA256",
            /// OP_HASH160 ; RIPEMD-160 of SHA-256
            Hash160 = 0xA9, "OP_HASH160",
            /// OP_HASH256 ; double SHA-256
            Hash256 = 0xAA, "OP_HASH256",
            /// OP_CODESEPARATOR ; mark the start of signed bytecode
            CodeSeparator = 0xAB, "OP_CODESEPARATOR",
            /// OP_CHECKSIG ; verify a transaction signature
            CheckSig = 0xAC, "OP_CHECKSIG",
            /// OP_CHECKSIGVERIFY ; OP_CHECKSIG then OP_VERIFY
            CheckSigVerify = 0xAD, "OP_CHECKSIGVERIFY",
            /// OP_CHECKMULTISIG ; verify M-of-N transaction signatures
            CheckMultiSig = 0xAE, "OP_CHECKMULTISIG",
            /// OP_CHECKMULTISIGVERIFY ; OP_CHECKMULTISIG then OP_VERIFY
            CheckMultiSigVerify = 0xAF, "OP_CHECKMULTISIGVERIFY",
            // =========================
            // Locktime and expansion
            // =========================
            /// OP_NOP1 ; does nothing
            Nop1 = 0xB0, "OP_NOP1",
            /// OP_CHECKLOCKTIMEVERIFY ; fail unless the transaction locktime is reached
            CheckLockTimeVerify = 0xB1, "OP_CHECKLOCKTIMEVERIFY",
            /// OP_CHECKSEQUENCEVERIFY ; fail unless the input sequence is reached
            CheckSequenceVerify = 0xB2, "OP_CHECKSEQUENCEVERIFY",
            /// OP_NOP4 ; does nothing
            Nop4 = 0xB3, "OP_NOP4",
            /// OP_NOP5 ; does nothing
            Nop5 = 0xB4, "OP_NOP5",
            /// OP_NOP6 ; does nothing
            Nop6 = 0xB5, "OP_NOP6",
            /// OP_NOP7 ; does nothing
            Nop7 = 0xB6, "OP_NOP7",
            /// OP_NOP8 ; does nothing
            Nop8 = 0xB7, "OP_NOP8",
            /// OP_NOP9 ; does nothing
            Nop9 = 0xB8, "OP_NOP9",
            /// OP_NOP10 ; does nothing
            Nop10 = 0xB9, "OP_NOP10",
            /// OP_CHECKDATASIG ; verify a signature over arbitrary data
            CheckDataSig = 0xBA, "OP_CHECKDATASIG",
            /// OP_CHECKDATASIGVERIFY ; OP_CHECKDATASIG then OP_VERIFY
            CheckDataSigVerify = 0xBB, "OP_CHECKDATASIGVERIFY",
            /// OP_REVERSEBYTES ; reverse the bytes of the top item
            ReverseBytes = 0xBC, "OP_REVERSEBYTES",
            // =========================
            // Native introspection
            // =========================
            /// OP_INPUTINDEX ; push the index of the evaluated input
            InputIndex = 0xC0, "OP_INPUTINDEX",
            /// OP_ACTIVEBYTECODE ; push the bytecode being evaluated
            ActiveBytecode = 0xC1, "OP_ACTIVEBYTECODE",
            /// OP_TXVERSION ; push the transaction version
            TxVersion = 0xC2, "OP_TXVERSION",
            /// OP_TXINPUTCOUNT ; push the number of inputs
            TxInputCount = 0xC3, "OP_TXINPUTCOUNT",
            /// OP_TXOUTPUTCOUNT ; push the number of outputs
            TxOutputCount = 0xC4, "OP_TXOUTPUTCOUNT",
            /// OP_TXLOCKTIME ; push the transaction locktime
            TxLocktime = 0xC5, "OP_TXLOCKTIME",
            /// OP_UTXOVALUE ; push the value of the Nth spent output
            UtxoValue = 0xC6, "OP_UTXOVALUE",
            /// OP_UTXOBYTECODE ; push the locking bytecode of the Nth spent output
            UtxoBytecode = 0xC7, "OP_UTXOBYTECODE",
            /// OP_OUTPOINTTXHASH ; push the outpoint hash of the Nth input
            OutpointTxHash = 0xC8, "OP_OUTPOINTTXHASH",
            /// OP_OUTPOINTINDEX ; push the outpoint index of the Nth input
            OutpointIndex = 0xC9, "OP_OUTPOINTINDEX",
            /// OP_INPUTBYTECODE ; push the unlocking bytecode of the Nth input
            InputBytecode = 0xCA, "OP_INPUTBYTECODE",
            /// OP_INPUTSEQUENCENUMBER ; push the sequence number of the Nth input
            InputSequenceNumber = 0xCB, "OP_INPUTSEQUENCENUMBER",
            /// OP_OUTPUTVALUE ; push the value of the Nth output
            OutputValue = 0xCC, "OP_OUTPUTVALUE",
            /// OP_OUTPUTBYTECODE ; push the locking bytecode of the Nth output
            OutputBytecode = 0xCD, "OP_OUTPUTBYTECODE",
            // =========================
            // CashTokens
            // =========================
            /// OP_UTXOTOKENCATEGORY ; push the token category of the Nth spent output
            UtxoTokenCategory = 0xCE, "OP_UTXOTOKENCATEGORY",
            /// OP_UTXOTOKENCOMMITMENT ; push the NFT commitment of the Nth spent output
            UtxoTokenCommitment = 0xCF, "OP_UTXOTOKENCOMMITMENT",
            /// OP_UTXOTOKENAMOUNT ; push the fungible amount of the Nth spent output
            UtxoTokenAmount = 0xD0, "OP_UTXOTOKENAMOUNT",
            /// OP_OUTPUTTOKENCATEGORY ; push the token category of the Nth output
            OutputTokenCategory = 0xD1, "OP_OUTPUTTOKENCATEGORY",
            /// OP_OUTPUTTOKENCOMMITMENT ; push the NFT commitment of the Nth output
            OutputTokenCommitment = 0xD2, "OP_OUTPUTTOKENCOMMITMENT",
            /// OP_OUTPUTTOKENAMOUNT ; push the fungible amount of the Nth output
            OutputTokenAmount = 0xD3, "OP_OUTPUTTOKENAMOUNT",
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $byte:literal, $mnemonic:literal
        ),* $(,)?
    ) => {
        /// Named opcode of the Bitcoin Cash VM.
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $byte,
            )*
        }

        impl Opcode {
            /// Decodes a byte into a named opcode.
            ///
            /// Returns `None` for direct pushes and unassigned bytes.
            pub const fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $( $byte => Some(Opcode::$name), )*
                    _ => None,
                }
            }

            /// Returns the canonical assembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Looks up an opcode by its canonical mnemonic (case-sensitive).
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $( $mnemonic => Some(Opcode::$name), )*
                    _ => None,
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

const PUSHBYTES_PREFIX: &str = "OP_PUSHBYTES_";
const UNKNOWN_PREFIX: &str = "OP_UNKNOWN";

/// Alternative spellings accepted by the assembler, never produced by the
/// disassembler.
const ALIASES: &[(&str, Opcode)] = &[
    ("OP_FALSE", Opcode::Op0),
    ("OP_TRUE", Opcode::Op1),
    ("OP_PUSHDATA_1", Opcode::PushData1),
    ("OP_PUSHDATA_2", Opcode::PushData2),
    ("OP_PUSHDATA_4", Opcode::PushData4),
    ("OP_NOP2", Opcode::CheckLockTimeVerify),
    ("OP_NOP3", Opcode::CheckSequenceVerify),
];

/// Returns true if `byte` is a direct push length prefix.
pub const fn is_direct_push(byte: u8) -> bool {
    byte >= 0x01 && byte as usize <= MAX_DIRECT_PUSH
}

/// Returns the mnemonic the disassembler uses for any byte.
///
/// Named opcodes use their canonical mnemonic, direct pushes render as
/// `OP_PUSHBYTES_n` and unassigned bytes as `OP_UNKNOWNn` (decimal).
pub fn mnemonic_for(byte: u8) -> Cow<'static, str> {
    if let Some(op) = Opcode::from_byte(byte) {
        Cow::Borrowed(op.mnemonic())
    } else if is_direct_push(byte) {
        Cow::Owned(format!("{PUSHBYTES_PREFIX}{byte}"))
    } else {
        Cow::Owned(format!("{UNKNOWN_PREFIX}{byte}"))
    }
}

/// Resolves any accepted mnemonic to its byte.
///
/// Accepts canonical names, aliases, `OP_PUSHBYTES_1..=75` and `OP_UNKNOWNn`
/// for bytes with no assigned opcode.
pub fn byte_for_mnemonic(name: &str) -> Option<u8> {
    if let Some(op) = Opcode::from_mnemonic(name) {
        return Some(op.into());
    }
    if let Some((_, op)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Some((*op).into());
    }
    if let Some(n) = name.strip_prefix(PUSHBYTES_PREFIX) {
        return parse_decimal_byte(n).filter(|b| is_direct_push(*b));
    }
    if let Some(n) = name.strip_prefix(UNKNOWN_PREFIX) {
        return parse_decimal_byte(n)
            .filter(|b| Opcode::from_byte(*b).is_none() && !is_direct_push(*b));
    }
    None
}

/// Parses a canonical decimal byte (no sign, no leading zeros).
fn parse_decimal_byte(s: &str) -> Option<u8> {
    if s.is_empty()
        || (s.len() > 1 && s.starts_with('0'))
        || !s.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    s.parse::<u8>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_byte_named_and_unnamed() {
        assert_eq!(Opcode::from_byte(0x76), Some(Opcode::Dup));
        assert_eq!(Opcode::from_byte(0xac), Some(Opcode::CheckSig));
        assert_eq!(Opcode::from_byte(0x14), None);
        assert_eq!(Opcode::from_byte(0xff), None);
    }

    #[test]
    fn small_integers_are_contiguous() {
        assert_eq!(Opcode::Op1 as u8, 0x51);
        assert_eq!(Opcode::Op16 as u8, 0x60);
        assert_eq!(Opcode::Op16 as u8 - Opcode::Op1 as u8, 15);
    }

    #[test]
    fn mnemonic_for_every_byte_resolves_back() {
        for byte in 0..=u8::MAX {
            let name = mnemonic_for(byte);
            assert_eq!(byte_for_mnemonic(&name), Some(byte), "{name}");
        }
    }

    #[test]
    fn mnemonic_fallbacks() {
        assert_eq!(mnemonic_for(0x01), "OP_PUSHBYTES_1");
        assert_eq!(mnemonic_for(0x4b), "OP_PUSHBYTES_75");
        assert_eq!(mnemonic_for(0xbd), "OP_UNKNOWN189");
        assert_eq!(mnemonic_for(0xff), "OP_UNKNOWN255");
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(byte_for_mnemonic("OP_FALSE"), Some(0x00));
        assert_eq!(byte_for_mnemonic("OP_TRUE"), Some(0x51));
        assert_eq!(byte_for_mnemonic("OP_NOP2"), Some(0xb1));
        assert_eq!(byte_for_mnemonic("OP_PUSHDATA_2"), Some(0x4d));
    }

    #[test]
    fn rejects_invalid_mnemonics() {
        assert_eq!(byte_for_mnemonic("OP_DUPP"), None);
        assert_eq!(byte_for_mnemonic("op_dup"), None);
        assert_eq!(byte_for_mnemonic("OP_PUSHBYTES_0"), None);
        assert_eq!(byte_for_mnemonic("OP_PUSHBYTES_76"), None);
        assert_eq!(byte_for_mnemonic("OP_PUSHBYTES_07"), None);
        // assigned bytes must use their real name
        assert_eq!(byte_for_mnemonic("OP_UNKNOWN118"), None);
        assert_eq!(byte_for_mnemonic("OP_UNKNOWN256"), None);
    }
}
