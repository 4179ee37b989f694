//! Bounded planetary metrics.
//!
//! [`EarthMetrics`] holds the eight scalars describing simulated planetary
//! health. Every field has a documented bound; [`EarthMetrics::clamped`] is
//! the single place those bounds are enforced. Population counts are
//! unsigned integers so that they can never go below zero, and all
//! arithmetic on them saturates instead of wrapping.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Inclusive bounds for a floating-point metric.
///
/// `None` on either side means that side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Lowest permitted value.
    pub min: Option<f64>,
    /// Highest permitted value.
    pub max: Option<f64>,
}

impl Bound {
    /// Create a bound from optional lower and upper limits.
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the bound.
    ///
    /// A `NaN` input collapses onto whichever limit is applied first, so the
    /// result is always finite when at least one side is bounded.
    pub fn clamp(self, value: f64) -> f64 {
        let floored = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(floored, |max| floored.min(max))
    }

    /// Whether `value` lies within the bound.
    pub fn contains(self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Atmospheric CO2: `(-inf, 2000]`.
pub const CO2_BOUND: Bound = Bound::new(None, Some(2000.0));

/// Toxicity index: `(-inf, 100]`.
pub const TOXICITY_BOUND: Bound = Bound::new(None, Some(100.0));

/// Mean surface temperature: `(-inf, 50]`.
pub const TEMPERATURE_BOUND: Bound = Bound::new(None, Some(50.0));

/// Ocean pH: `[6.0, +inf)`.
pub const OCEAN_ACIDITY_BOUND: Bound = Bound::new(Some(6.0), None);

/// Ice cap melting percentage: `(-inf, 100]`.
pub const ICE_CAP_BOUND: Bound = Bound::new(None, Some(100.0));

// ---------------------------------------------------------------------------
// EarthMetrics
// ---------------------------------------------------------------------------

/// The eight bounded scalars describing simulated planetary health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EarthMetrics {
    /// Atmospheric CO2, ppm-like scalar.
    pub co2_level: f64,
    /// Pollution/toxicity index.
    pub toxicity_level: f64,
    /// Mean surface temperature.
    pub temperature: f64,
    /// Number of living humans.
    pub human_population: u64,
    /// Number of living animals.
    pub animal_population: u64,
    /// Number of living plants.
    pub plant_population: u64,
    /// pH-like scalar; decreasing means more acidic.
    pub ocean_acidity: f64,
    /// Percent of the ice caps melted.
    pub ice_cap_melting: f64,
}

impl EarthMetrics {
    /// The starting row, also restored by a reset.
    pub const INITIAL: Self = Self {
        co2_level: 415.0,
        toxicity_level: 5.0,
        temperature: 30.0,
        human_population: 9_000_000_000,
        animal_population: 100_000_000_000,
        plant_population: 1_000_000_000_000,
        ocean_acidity: 8.1,
        ice_cap_melting: 10.0,
    };

    /// Return a copy with every floating-point field clamped to its bound.
    ///
    /// Population fields are unsigned and need no clamping.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            co2_level: CO2_BOUND.clamp(self.co2_level),
            toxicity_level: TOXICITY_BOUND.clamp(self.toxicity_level),
            temperature: TEMPERATURE_BOUND.clamp(self.temperature),
            ocean_acidity: OCEAN_ACIDITY_BOUND.clamp(self.ocean_acidity),
            ice_cap_melting: ICE_CAP_BOUND.clamp(self.ice_cap_melting),
            ..self
        }
    }

    /// Whether every field lies within its documented bound.
    pub fn is_within_bounds(&self) -> bool {
        CO2_BOUND.contains(self.co2_level)
            && TOXICITY_BOUND.contains(self.toxicity_level)
            && TEMPERATURE_BOUND.contains(self.temperature)
            && OCEAN_ACIDITY_BOUND.contains(self.ocean_acidity)
            && ICE_CAP_BOUND.contains(self.ice_cap_melting)
    }
}

impl Default for EarthMetrics {
    fn default() -> Self {
        Self::INITIAL
    }
}

// ---------------------------------------------------------------------------
// MetricsDelta
// ---------------------------------------------------------------------------

/// Per-field increments applied by an incremental mutation.
///
/// Population deltas are signed so a single delta can grow or shrink a
/// count; applying them saturates at `0` and `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricsDelta {
    /// Change in CO2.
    pub co2_level: f64,
    /// Change in toxicity.
    pub toxicity_level: f64,
    /// Change in temperature.
    pub temperature: f64,
    /// Change in human population.
    pub human_population: i64,
    /// Change in animal population.
    pub animal_population: i64,
    /// Change in plant population.
    pub plant_population: i64,
    /// Change in ocean pH.
    pub ocean_acidity: f64,
    /// Change in ice cap melting percentage.
    pub ice_cap_melting: f64,
}
