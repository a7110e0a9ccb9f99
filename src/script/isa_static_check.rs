#[cfg(test)]
mod tests {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const EXPECTED_ISA_HASH: u64 = 7168568271216830936;
    const EXPECTED_OPCODE_COUNT: usize = 134;

    fn fnv1a64(mut h: u64, bytes: &[u8]) -> u64 {
        for b in bytes {
            h ^= *b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    macro_rules! hash_isa {
        (
            $( $(#[$doc:meta])* $name:ident = $byte:literal, $mnemonic:literal ),* $(,)?
        ) => {{
            let mut h = FNV_OFFSET;
            let mut count = 0usize;
            $(
                h = fnv1a64(h, stringify!($name).as_bytes());
                h = fnv1a64(h, &[crate::script::isa::Opcode::$name as u8]);
                h = fnv1a64(h, $mnemonic.as_bytes());
                count += 1;
            )*
            (h, count)
        }};
    }

    fn current_isa_hash() -> (u64, usize) {
        crate::for_each_opcode!(hash_isa)
    }

    #[test]
    #[ignore]
    fn print_isa_hash() {
        let (hash, count) = current_isa_hash();
        println!("ISA_HASH={hash} OPCODES={count}");
    }

    #[test]
    fn isa_hash_unchanged() {
        let (hash, count) = current_isa_hash();
        assert_eq!(count, EXPECTED_OPCODE_COUNT);
        assert_eq!(hash, EXPECTED_ISA_HASH);
    }
}
