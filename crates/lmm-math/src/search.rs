//! Binary search over sorted time tables.
//!
//! Every time-dependent lookup of the model (next reset, tabulated
//! volatility segment, accrual period matching) goes through these three
//! functions.

use lmm_core::Real;

/// Number of entries `<= t`: the first index whose value is strictly
/// greater than `t`.
#[inline]
pub fn upper_bound(sorted: &[Real], t: Real) -> usize {
    sorted.partition_point(|&x| x <= t)
}

/// Number of entries `< t`: the first index whose value is `>= t`.
#[inline]
pub fn lower_bound(sorted: &[Real], t: Real) -> usize {
    sorted.partition_point(|&x| x < t)
}

/// Index of the largest entry `<= t`, or `None` if every entry exceeds `t`.
#[inline]
pub fn predecessor(sorted: &[Real], t: Real) -> Option<usize> {
    upper_bound(sorted, t).checked_sub(1)
}
