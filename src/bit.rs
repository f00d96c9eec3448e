//! Bit manipulation helpers for the packed column words.

/// Parallel bit extract: gathers the bits of `src` selected by `mask` into the
/// low end of the result, preserving their order.
///
/// Uses the BMI2 `pext` instruction when the crate is compiled with that target
/// feature and a run-at-a-time shift/mask loop otherwise.
///
/// # Examples
/// ```
/// use popstar_exhaustive::bit::pext_u32;
/// assert_eq!(pext_u32(0b1011_0110, 0b1111_0000), 0b1011);
/// assert_eq!(pext_u32(0b1011_0110, 0b0101_0101), 0b0110);
/// ```
#[inline]
pub fn pext_u32(src: u32, mask: u32) -> u32 {
    #[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
    {
        // SAFETY: guarded by the bmi2 target feature.
        unsafe { std::arch::x86_64::_pext_u32(src, mask) }
    }
    #[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
    {
        pext_u32_portable(src, mask)
    }
}

/// Portable `pext`, moving one run of consecutive mask bits per iteration.
#[inline]
pub fn pext_u32_portable(src: u32, mut mask: u32) -> u32 {
    let mut result = 0u32;
    let mut written = 0u32;
    while mask != 0 {
        let low = mask.trailing_zeros();
        let run = (mask >> low).trailing_ones();
        let chunk = (src >> low) & low_bits(run);
        result |= chunk << written;
        written += run;
        mask = ((mask as u64) & (u64::MAX << (low + run))) as u32;
    }
    result
}

/// Removes every bit set in `excluded` from `src` and closes the gaps, so the
/// bits above each removed range slide down to fill it.
///
/// This is the column compaction used after a group is eliminated: with
/// `excluded` covering whole 3-bit cells, the cells above drop into place.
///
/// # Examples
/// ```
/// use popstar_exhaustive::bit::block_pext_u32;
/// // Cells (low to high): 1, 2, 3. Remove the middle one.
/// let column = 1 | 2 << 3 | 3 << 6;
/// assert_eq!(block_pext_u32(column, 0b111 << 3), 1 | 3 << 3);
/// ```
#[inline]
pub fn block_pext_u32(src: u32, excluded: u32) -> u32 {
    pext_u32(src, !excluded)
}

#[inline]
fn low_bits(n: u32) -> u32 {
    ((1u64 << n) - 1) as u32
}
