//! Random number generators.
//!
//! Uniform Mersenne Twister (MT19937-64), its inverse-cumulative-normal
//! transform, and [`GaussianSequenceGenerator`], which fills vectors of
//! independent standard normals from either backend.

use crate::distributions::normal_cdf_inverse;
use lmm_core::Real;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_mt::Mt19937GenRand64;
use serde::{Deserialize, Serialize};

/// Uniform deviates in `[0, 1)` from MT19937-64.
#[derive(Clone)]
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Seeded generator.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Next uniform deviate in `[0, 1)`.
    pub fn next_real(&mut self) -> Real {
        // top 53 bits
        (self.rng.next_u64() >> 11) as Real * (1.0 / (1u64 << 53) as Real)
    }
}

/// Standard normal deviates by inversion of MT19937-64 uniforms.
#[derive(Clone)]
pub struct InverseCumulativeNormalRng {
    uniform: MersenneTwisterUniformRng,
}

impl InverseCumulativeNormalRng {
    /// Seeded generator.
    pub fn new(seed: u64) -> Self {
        Self {
            uniform: MersenneTwisterUniformRng::new(seed),
        }
    }

    /// Next standard normal deviate.
    pub fn next_real(&mut self) -> Real {
        loop {
            let u = self.uniform.next_real();
            if u > 0.0 {
                return normal_cdf_inverse(u);
            }
        }
    }
}

/// Backend used by [`GaussianSequenceGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// MT19937-64 uniforms mapped through the inverse normal CDF.
    #[default]
    MersenneTwister,
    /// `rand`'s `StdRng` sampled with `rand_distr::StandardNormal`.
    StdRng,
}

#[derive(Clone)]
enum GaussianSource {
    MersenneTwister(InverseCumulativeNormalRng),
    Std(StdRng),
}

/// Produces vectors of `dimension` independent standard normals.
#[derive(Clone)]
pub struct GaussianSequenceGenerator {
    dimension: usize,
    source: GaussianSource,
}

impl GaussianSequenceGenerator {
    /// Seeded generator of the given kind.
    pub fn new(kind: GeneratorKind, dimension: usize, seed: u64) -> Self {
        let source = match kind {
            GeneratorKind::MersenneTwister => {
                GaussianSource::MersenneTwister(InverseCumulativeNormalRng::new(seed))
            }
            GeneratorKind::StdRng => GaussianSource::Std(StdRng::seed_from_u64(seed)),
        };
        Self { dimension, source }
    }

    /// Length of each sequence.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Overwrite `out` with fresh draws.
    pub fn fill(&mut self, out: &mut [Real]) {
        match &mut self.source {
            GaussianSource::MersenneTwister(rng) => {
                for z in out.iter_mut() {
                    *z = rng.next_real();
                }
            }
            GaussianSource::Std(rng) => {
                for z in out.iter_mut() {
                    *z = StandardNormal.sample(rng);
                }
            }
        }
    }

    /// Next sequence as a new vector.
    pub fn next_sequence(&mut self) -> Vec<Real> {
        let mut out = vec![0.0; self.dimension];
        self.fill(&mut out);
        out
    }
}
