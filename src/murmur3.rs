//! MurmurHash3, x64 variant with 128-bit output.
//!
//! Bit-for-bit compatible with the reference `MurmurHash3_x64_128`: the input is
//! consumed in 16-byte blocks by two 64-bit lanes, the trailing partial block is
//! folded in separately, and both lanes go through `fmix64` at the end.
//!
//! [Reference implementation](https://github.com/aappleby/smhasher/blob/master/src/MurmurHash3.cpp)

use crate::hash::HashDigest;

/// Seed used by [`crate::hash128`]. Fixed so digests are stable across processes.
pub const SEED: u64 = 0;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Hash `data` with MurmurHash3 x64-128 and the given `seed`.
pub fn murmur3_x64_128(data: &[u8], seed: u64) -> HashDigest {
    let mut h1 = seed;
    let mut h2 = seed;

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        let (lo, hi) = block.split_at(8);
        h1 ^= mix_k1(read_u64(lo));
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        h2 ^= mix_k2(read_u64(hi));
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    if tail.len() > 8 {
        h2 ^= mix_k2(read_u64(&tail[8..]));
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(read_u64(&tail[..tail.len().min(8)]));
    }

    let len = data.len() as u64;
    h1 ^= len;
    h2 ^= len;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    HashDigest { h1, h2 }
}

/// Little-endian read of up to 8 bytes, zero-padded on the high side.
#[inline]
fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[inline]
fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

#[inline]
fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// Finalization mix, forces all bits of a lane to avalanche.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"", 0 => (0, 0); "empty")]
    #[test_case(b"hello", 0 => (0xcbd8a7b341bd9b02, 0x5b1e906a48ae1d19); "hello")]
    #[test_case(b"hello", 42 => (0xc4b8b3c960af6f08, 0x2334b875b0efbc7a); "hello with seed")]
    #[test_case(
        b"The quick brown fox jumps over the lazy dog", 0
        => (0xe34bbc7bbc071b6c, 0x7a433ca9c49a9347);
        "quick brown fox"
    )]
    fn test_reference_vectors(data: &[u8], seed: u64) -> (u64, u64) {
        let digest = murmur3_x64_128(data, seed);
        (digest.h1, digest.h2)
    }

    #[test_case(1 => (0x4610abe56eff5cb5, 0x51622daa78f83583))]
    #[test_case(8 => (0x47a7e1bdd68e2fc8, 0x60e6ee02ec31dcc7))]
    #[test_case(9 => (0xfbb4cb0f6e812d32, 0x78de751d0200ffb9))]
    #[test_case(15 => (0x47231598fd4925e9, 0xcd846dee88c67de9))]
    #[test_case(16 => (0x444924b591903f30, 0xab906456762fe845))]
    #[test_case(17 => (0x5c76f40f9fe7c20e, 0xc15f026b9edaa824))]
    #[test_case(31 => (0x053dd3e1a32cd094, 0x9ee59aefb4005490))]
    #[test_case(32 => (0xc66d9022b62f500f, 0x1c050a6e34c31151))]
    #[test_case(33 => (0x7d41281bfaba4612, 0x55ac8073a7d6a30b))]
    fn test_tail_lengths(len: u8) -> (u64, u64) {
        let data: Vec<u8> = (0..len).collect();
        let digest = murmur3_x64_128(&data, SEED);
        (digest.h1, digest.h2)
    }

    #[test]
    fn test_seed_changes_digest() {
        let data: Vec<u8> = (0..33).collect();
        let digest = murmur3_x64_128(&data, 0x9747_b28c);
        assert_eq!(digest.h1, 0xdd19c56102f480a2);
        assert_eq!(digest.h2, 0x57dba1ef9f008a8f);
        assert_ne!(digest, murmur3_x64_128(&data, SEED));
    }
}
