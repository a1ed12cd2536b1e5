//! Rank over the 26-bit child mask.

/// Counts the set bits of a 32-bit word with the SWAR reduction.
///
/// Produces the same result as [`u32::count_ones`], which lookups use so the
/// compiler can emit a hardware `POPCNT` where the target has one.
#[inline]
pub const fn count_set_bits(v: u32) -> u32 {
    let mut n = v;
    // 2-bit partial sums
    n -= (n >> 1) & 0x5555_5555;
    // 4-bit partial sums
    n = (n & 0x3333_3333) + ((n >> 2) & 0x3333_3333);
    // 8-bit partial sums
    n = (n + (n >> 4)) & 0x0F0F_0F0F;
    n.wrapping_mul(0x0101_0101) >> 24
}

/// Returns the number of set bits in `mask` strictly below bit `code`,
/// i.e. the ordinal of child `code` among the node's children.
///
/// `code` must be below 32.
#[inline]
pub const fn rank(mask: u32, code: u32) -> u32 {
    debug_assert!(code < 32);
    (mask & ((1u32 << code) - 1)).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::CHILD_MASK;

    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0
        }
    }

    fn reference(mask: u32) -> u32 {
        (0..32).filter(|b| mask & (1 << b) != 0).count() as u32
    }

    #[test]
    fn zero_and_full_masks() {
        assert_eq!(count_set_bits(0), 0);
        assert_eq!(count_set_bits(CHILD_MASK), 26);
        assert_eq!(count_set_bits(u32::MAX), 32);
    }

    #[test]
    fn single_bits() {
        for b in 0..32 {
            assert_eq!(count_set_bits(1 << b), 1, "bit {b}");
        }
    }

    #[test]
    fn random_26_bit_masks() {
        let mut rng = Lcg(42);
        for _ in 0..10_000 {
            let mask = (rng.next() >> 17) as u32 & CHILD_MASK;
            assert_eq!(count_set_bits(mask), reference(mask));
            assert_eq!(count_set_bits(mask), mask.count_ones());
        }
    }

    #[test]
    fn rank_counts_bits_below() {
        let mask = 0b1011_0101;
        assert_eq!(rank(mask, 0), 0);
        assert_eq!(rank(mask, 2), 1);
        assert_eq!(rank(mask, 4), 2);
        assert_eq!(rank(mask, 5), 3);
        assert_eq!(rank(mask, 7), 4);
        assert_eq!(rank(CHILD_MASK, 25), 25);
    }

    #[test]
    fn rank_matches_swar_below_every_letter() {
        let mut rng = Lcg(7);
        for _ in 0..1_000 {
            let mask = (rng.next() >> 17) as u32 & CHILD_MASK;
            for code in 0..26 {
                assert_eq!(
                    rank(mask, code),
                    count_set_bits(mask & ((1 << code) - 1)),
                    "mask {mask:#x} code {code}"
                );
            }
        }
    }
}
