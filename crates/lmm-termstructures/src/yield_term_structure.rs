//! `YieldTermStructure`: discount factors and the rates implied by them.
//!
//! Implementors provide [`discount_impl`](YieldTermStructure::discount_impl);
//! zero and forward rates follow from it.

use crate::term_structure::TermStructure;
use lmm_core::{ensure, errors::Result, DiscountFactor, Rate, Time};
use lmm_time::Date;

/// A yield curve.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor `P(0, t)` for `t >= 0`.
    fn discount_impl(&self, t: Time) -> DiscountFactor;

    /// Discount factor for a time.
    fn discount(&self, t: Time) -> DiscountFactor {
        if t <= 0.0 {
            1.0
        } else {
            self.discount_impl(t)
        }
    }

    /// Discount factor for a date.
    fn discount_date(&self, date: Date) -> DiscountFactor {
        self.discount(self.time_from_reference(date))
    }

    /// Continuously-compounded zero rate to `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        let t = t.max(1e-4);
        -self.discount(t).ln() / t
    }

    /// Simply-compounded forward rate over `[t1, t2]` with accrual `tau`:
    /// `(P(t1)/P(t2) − 1) / tau`.
    fn simple_forward_rate(&self, t1: Time, t2: Time, tau: Time) -> Result<Rate> {
        ensure!(t2 > t1, "forward period [{t1}, {t2}] is empty");
        ensure!(tau > 0.0, "accrual period must be positive, got {tau}");
        Ok((self.discount(t1) / self.discount(t2) - 1.0) / tau)
    }
}
