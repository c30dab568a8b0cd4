//! Physical generation model: deterministic shape, randomized values.
//!
//! All randomness flows through a single `StdRng` owned by the policy,
//! seeded once from OS entropy; there is no per-call reseeding and no
//! seed-reproducibility guarantee. The statistical bounds below are part of
//! the contract and are what the tests check:
//!
//! - machine temperature seeds uniformly in `NOMINAL ± SEED_SPREAD`
//! - each walk step is `uniform(-MAX_STEP, MAX_STEP)` plus a mean-reversion
//!   pull of `REVERSION * (NOMINAL - previous)`, which keeps the walk
//!   stationary around `NOMINAL` with bounded variance over long runs; the
//!   per-step delta is bounded by `MAX_STEP + REVERSION * |previous - NOMINAL|`
//! - pressure is affine in temperature plus `uniform(-NOISE, NOISE)`, so it
//!   is monotonically non-decreasing in temperature in expectation
//! - ambient temperature is uniform in `AMBIENT_BASE ± AMBIENT_SPREAD`,
//!   humidity uniform in `[HUMIDITY_MIN, HUMIDITY_MAX]`, both independent of
//!   machine state

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Operating point of the simulated machine, in degrees Celsius.
pub const TEMPERATURE_NOMINAL: f64 = 65.0;
/// Half-width of the uniform seed distribution around the nominal value.
pub const TEMPERATURE_SEED_SPREAD: f64 = 5.0;
/// Bound on the random component of one walk step.
pub const TEMPERATURE_MAX_STEP: f64 = 1.0;
/// Fraction of the distance back to nominal recovered each step.
pub const TEMPERATURE_REVERSION: f64 = 0.05;

/// Machine pressure at the nominal temperature.
pub const PRESSURE_BASELINE: f64 = 10.0;
/// Pressure gained per degree of machine temperature.
pub const PRESSURE_SLOPE: f64 = 0.475;
/// Bound on the pressure measurement noise.
pub const PRESSURE_NOISE: f64 = 0.1;

const AMBIENT_BASE: f64 = 21.0;
const AMBIENT_SPREAD: f64 = 5.0;
const HUMIDITY_MIN: f64 = 24.0;
const HUMIDITY_MAX: f64 = 27.0;

pub struct GenerationPolicy {
    rng: StdRng,
}

impl GenerationPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed value for a machine temperature, used on reset and for the
    /// first reading of a newly tracked instance.
    pub fn initial_machine_temperature(&mut self) -> f64 {
        self.rng.random_range(
            TEMPERATURE_NOMINAL - TEMPERATURE_SEED_SPREAD
                ..=TEMPERATURE_NOMINAL + TEMPERATURE_SEED_SPREAD,
        )
    }

    /// Advance the random walk by one bounded step with mean reversion.
    pub fn next_machine_temperature(&mut self, previous: f64) -> f64 {
        let step = self
            .rng
            .random_range(-TEMPERATURE_MAX_STEP..=TEMPERATURE_MAX_STEP);
        previous + step + TEMPERATURE_REVERSION * (TEMPERATURE_NOMINAL - previous)
    }

    /// Machine pressure correlated with temperature, plus measurement noise.
    pub fn pressure(&mut self, temperature: f64) -> f64 {
        PRESSURE_BASELINE
            + PRESSURE_SLOPE * (temperature - TEMPERATURE_NOMINAL)
            + self.rng.random_range(-PRESSURE_NOISE..=PRESSURE_NOISE)
    }

    /// Room temperature, independent of machine state.
    pub fn ambient_temperature(&mut self) -> f64 {
        self.rng
            .random_range(AMBIENT_BASE - AMBIENT_SPREAD..=AMBIENT_BASE + AMBIENT_SPREAD)
    }

    /// Relative humidity percentage, independent of machine state.
    pub fn humidity(&mut self) -> f64 {
        self.rng.random_range(HUMIDITY_MIN..=HUMIDITY_MAX)
    }
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self::new()
    }
}
