use lmm_methods::TimeGrid;
use proptest::prelude::*;

proptest! {
    #[test]
    fn grid_hits_mandatory_times_with_bounded_steps(
        mut mandatory in prop::collection::vec(0.05f64..30.0, 1..8),
        steps in 1usize..60,
    ) {
        mandatory.sort_by(|a, b| a.total_cmp(b));
        let grid = TimeGrid::from_times(&mandatory, steps).unwrap();
        let end = mandatory[mandatory.len() - 1];
        prop_assert_eq!(grid.times()[0], 0.0);
        prop_assert!((grid.end() - end).abs() < 1e-12);
        for t in &mandatory {
            prop_assert!(grid.index(*t).is_some(), "missing {}", t);
        }
        let max_dt = end / steps as f64;
        for i in 0..grid.steps() {
            prop_assert!(grid.dt(i) > 0.0);
            prop_assert!(grid.dt(i) <= max_dt * (1.0 + 1e-9));
        }
    }
}
