//! Simulation time grids.

use lmm_core::{ensure, errors::Result, Real, Time};

/// Tolerance below which two grid times are considered equal.
const TIME_EPSILON: Real = 1e-12;

/// Increasing time points starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
}

impl TimeGrid {
    /// `steps` equal intervals on `[0, end]`.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        ensure!(steps > 0, "a time grid needs at least one step");
        ensure!(end > 0.0, "grid end must be positive, got {end}");
        let dt = end / steps as Real;
        let times: Vec<Time> = (0..=steps).map(|i| i as Real * dt).collect();
        Ok(Self::from_sorted(times))
    }

    /// Grid hitting every mandatory time, with each gap between them cut
    /// into equal steps no longer than `last / steps`.
    pub fn from_times(mandatory: &[Time], steps: usize) -> Result<Self> {
        ensure!(!mandatory.is_empty(), "a time grid needs at least one mandatory time");
        ensure!(
            mandatory.iter().all(|t| t.is_finite() && *t >= 0.0),
            "mandatory times must be finite and non-negative"
        );
        let mut points: Vec<Time> = Vec::with_capacity(mandatory.len() + 1);
        points.push(0.0);
        points.extend_from_slice(mandatory);
        points.sort_by(|a, b| a.total_cmp(b));
        points.dedup_by(|a, b| (*a - *b).abs() < TIME_EPSILON);

        let end = points[points.len() - 1];
        ensure!(end > 0.0, "the last mandatory time must be positive");
        let max_dt = if steps == 0 { end } else { end / steps as Real };

        let mut times = vec![0.0];
        for w in points.windows(2) {
            let (start, gap) = (w[0], w[1] - w[0]);
            let n = ((gap / max_dt - TIME_EPSILON).ceil() as usize).max(1);
            let dt = gap / n as Real;
            times.extend((1..n).map(|k| start + k as Real * dt));
            times.push(w[1]);
        }
        Ok(Self::from_sorted(times))
    }

    fn from_sorted(times: Vec<Time>) -> Self {
        let dts = times.windows(2).map(|w| w[1] - w[0]).collect();
        Self { times, dts }
    }

    /// Number of time points.
    pub fn size(&self) -> usize {
        self.times.len()
    }

    /// Number of steps.
    pub fn steps(&self) -> usize {
        self.dts.len()
    }

    /// Time at index `i`.
    pub fn time(&self, i: usize) -> Time {
        self.times[i]
    }

    /// Length of step `i` (from point `i` to `i + 1`).
    pub fn dt(&self, i: usize) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Index of the grid point equal to `t`, if any.
    pub fn index(&self, t: Time) -> Option<usize> {
        let i = self.times.partition_point(|&x| x < t - TIME_EPSILON);
        (i < self.times.len() && (self.times[i] - t).abs() < TIME_EPSILON).then_some(i)
    }
}
