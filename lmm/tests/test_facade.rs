//! End-to-end use of the facade: schedule from dates, calibrated model,
//! engines.

use approx::assert_relative_eq;
use lmm::core::Compounding;
use lmm::models::{
    ForwardRateSchedule, LiborForwardModel, LinearExponentialCorrelation, LinearExponentialVolatility,
};
use lmm::pricingengines::{
    AnalyticCapFloorEngine, CapFloor, CapFloorType, LfmSwaptionEngine, PricingEngine, Swaption, SwaptionType,
};
use lmm::termstructures::{FlatForward, YieldTermStructure};
use lmm::time::{Actual360, Actual365Fixed, Date, ScheduleBuilder, WeekendsOnly};
use std::sync::Arc;

fn model() -> Arc<LiborForwardModel> {
    let today = Date::from_ymd_opt(2024, 1, 2).unwrap();
    let curve: Arc<dyn YieldTermStructure> =
        Arc::new(FlatForward::new(today, 0.04, Arc::new(Actual365Fixed), Compounding::Continuous));
    let spot = Date::from_ymd_opt(2024, 3, 1).unwrap();
    let periods = ScheduleBuilder::new(spot, 6, 10, &WeekendsOnly)
        .with_fixing_days(2)
        .build()
        .unwrap();
    let schedule = ForwardRateSchedule::new(&periods, &Actual360, curve).unwrap();
    let n = schedule.size();
    let fixings = schedule.fixing_times().to_vec();
    Arc::new(
        LiborForwardModel::from_schedule(
            schedule,
            LinearExponentialVolatility::new(fixings, 0.1, 0.5, 0.05, 0.15).unwrap().into(),
            LinearExponentialCorrelation::new(n, 0.3, 0.2, None).unwrap().into(),
        )
        .unwrap(),
    )
}

#[test]
fn engines_on_a_dated_schedule() {
    let m = model();
    assert_eq!(m.process().fixing_times().len(), 10);

    let caps = AnalyticCapFloorEngine::new(Arc::clone(&m));
    let strip = caps
        .calculate(&CapFloor::new(CapFloorType::Cap, 0.04, 1, 4).unwrap())
        .unwrap();
    let sum: f64 = (1..5)
        .map(|i| caps.optionlet(CapFloorType::Cap, 0.04, i).unwrap())
        .sum();
    assert_relative_eq!(strip.npv, sum, max_relative = 1e-12);
    assert!(strip.npv > 0.0);

    let swaptions = LfmSwaptionEngine::new(m);
    let r = swaptions
        .calculate(&Swaption::new(SwaptionType::Payer, 0.04, 1, 4).unwrap())
        .unwrap();
    assert!(r.npv > 0.0);
    assert!(r.additional_results["volatility"] > 0.0);
}
