//! Black (1976) formula for options on a lognormal forward.

use crate::distributions::normal_cdf;
use lmm_core::{ensure, errors::Result, OptionType, Real};

/// Black price of an option on `forward` struck at `strike`, where
/// `std_dev = σ·√T` and the result is multiplied by `discount`.
///
/// A zero standard deviation gives the discounted intrinsic value.
pub fn black_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
) -> Result<Real> {
    ensure!(std_dev >= 0.0, "standard deviation must be non-negative, got {std_dev}");
    ensure!(discount > 0.0, "discount must be positive, got {discount}");
    ensure!(forward > 0.0, "forward must be positive, got {forward}");
    ensure!(strike >= 0.0, "strike must be non-negative, got {strike}");

    let sign = option_type.sign();
    if std_dev == 0.0 || strike == 0.0 {
        return Ok(discount * (sign * (forward - strike)).max(0.0));
    }
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    let value = sign * (forward * normal_cdf(sign * d1) - strike * normal_cdf(sign * d2));
    Ok(discount * value.max(0.0))
}
