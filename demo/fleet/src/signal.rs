//! Bounded random-walk signal generation.
//!
//! Every tracked quantity evolves independently: each step adds a uniform
//! perturbation in `[-volatility/2, +volatility/2)` to the current value and
//! clamps the result into the quantity's `[min, max]` band.
//!
//! | Quantity    | Initial value   | Volatility | Bounds     |
//! |-------------|-----------------|------------|------------|
//! | `temp`      | 20 + U[0, 10)   | 0.10       | [18, 32]   |
//! | `amb_humid` | 50 + U[0, 20)   | 0.10       | [30, 80]   |
//! | `setpoint`  | 22 + U[0, 4)    | 0.05       | [20, 26]   |
//! | `amb_temp`  | 18 + U[0, 10)   | 0.10       | [15, 35]   |
//! | `coverage`  | 40 + U[0, 40)   | 0.10       | [0, 100]   |

use chrono::{DateTime, Utc};
use rand::Rng;
use telemetry_core::Sample;

/// Clamped uniform random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedRandomWalk {
    /// Full width of the per-step perturbation
    pub volatility: f64,
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl BoundedRandomWalk {
    /// Create a new walk. `min` must not exceed `max`.
    pub const fn new(volatility: f64, min: f64, max: f64) -> Self {
        Self {
            volatility,
            min,
            max,
        }
    }

    /// Advance `current` by one step using a uniform draw in `[0, 1)`.
    pub fn step(&self, current: f64, draw: f64) -> f64 {
        self.clamp(current + (draw - 0.5) * self.volatility)
    }

    /// Clamp into `[min, max]`. NaN collapses to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() || value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// Draw the next value of a bounded random walk.
pub fn next_value<R: Rng + ?Sized>(
    rng: &mut R,
    current: f64,
    volatility: f64,
    min: f64,
    max: f64,
) -> f64 {
    BoundedRandomWalk::new(volatility, min, max).step(current, rng.gen::<f64>())
}

/// Static description of a tracked quantity.
#[derive(Debug, Clone, Copy)]
pub struct QuantitySpec {
    /// Field name on the sample
    pub name: &'static str,
    /// Lowest initial value
    pub base: f64,
    /// Width of the uniform initial offset
    pub spread: f64,
    /// Walk applied on every sampling tick
    pub walk: BoundedRandomWalk,
}

impl QuantitySpec {
    /// Draw a starting value in `[base, base + spread)`.
    pub fn initial_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.walk.clamp(self.base + rng.gen::<f64>() * self.spread)
    }
}

/// Zone temperature in °C
pub const TEMP: QuantitySpec = QuantitySpec {
    name: "temp",
    base: 20.0,
    spread: 10.0,
    walk: BoundedRandomWalk::new(0.1, 18.0, 32.0),
};

/// Ambient relative humidity in %
pub const AMB_HUMID: QuantitySpec = QuantitySpec {
    name: "amb_humid",
    base: 50.0,
    spread: 20.0,
    walk: BoundedRandomWalk::new(0.1, 30.0, 80.0),
};

/// Temperature setpoint in °C
pub const SETPOINT: QuantitySpec = QuantitySpec {
    name: "setpoint",
    base: 22.0,
    spread: 4.0,
    walk: BoundedRandomWalk::new(0.05, 20.0, 26.0),
};

/// Ambient temperature in °C
pub const AMB_TEMP: QuantitySpec = QuantitySpec {
    name: "amb_temp",
    base: 18.0,
    spread: 10.0,
    walk: BoundedRandomWalk::new(0.1, 15.0, 35.0),
};

/// Cooling coverage in %
pub const COVERAGE: QuantitySpec = QuantitySpec {
    name: "coverage",
    base: 40.0,
    spread: 40.0,
    walk: BoundedRandomWalk::new(0.1, 0.0, 100.0),
};

/// A quantity together with its current value.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    spec: QuantitySpec,
    value: f64,
}

impl Quantity {
    /// Start a quantity at a random initial value.
    pub fn start<R: Rng + ?Sized>(spec: QuantitySpec, rng: &mut R) -> Self {
        let value = spec.initial_value(rng);
        Self { spec, value }
    }

    /// Advance one step and return the new value.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.value = self.spec.walk.step(self.value, rng.gen::<f64>());
        self.value
    }
}

/// The full set of quantities one device tracks.
#[derive(Debug, Clone)]
pub struct EnvironmentSignals {
    temp: Quantity,
    amb_humid: Quantity,
    setpoint: Quantity,
    amb_temp: Quantity,
    coverage: Quantity,
}

impl EnvironmentSignals {
    /// Start every quantity at a random initial value.
    pub fn start<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            temp: Quantity::start(TEMP, rng),
            amb_humid: Quantity::start(AMB_HUMID, rng),
            setpoint: Quantity::start(SETPOINT, rng),
            amb_temp: Quantity::start(AMB_TEMP, rng),
            coverage: Quantity::start(COVERAGE, rng),
        }
    }

    /// Advance every quantity one step and snapshot the result at `ts`.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R, ts: DateTime<Utc>) -> Sample {
        Sample::new(
            ts,
            self.temp.advance(rng),
            self.amb_humid.advance(rng),
            self.setpoint.advance(rng),
            self.amb_temp.advance(rng),
            self.coverage.advance(rng),
        )
    }
}
