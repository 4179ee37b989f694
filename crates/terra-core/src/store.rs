//! Owned store of the current planetary metrics.
//!
//! [`MetricsStore`] is the only holder of [`EarthMetrics`]. It exposes two
//! mutation policies:
//!
//! - [`apply_delta`](MetricsStore::apply_delta) -- incremental, used by the
//!   passive decay ticker.
//! - [`replace`](MetricsStore::replace) -- absolute, used when the analysis
//!   service returns a new world state.
//!
//! Both clamp every field to its bound before the new value is stored.

use terra_types::{EarthMetrics, MetricsDelta};

/// Owned, always-in-bounds metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsStore {
    current: EarthMetrics,
}

impl MetricsStore {
    /// Create a store holding [`EarthMetrics::INITIAL`].
    pub const fn new() -> Self {
        Self {
            current: EarthMetrics::INITIAL,
        }
    }

    /// Return a copy of the current metrics.
    pub const fn get(&self) -> EarthMetrics {
        self.current
    }

    /// Add `delta` to every field, then clamp.
    ///
    /// Population counts use saturating signed addition, so a large
    /// negative delta bottoms out at zero instead of wrapping.
    pub fn apply_delta(&mut self, delta: &MetricsDelta) -> EarthMetrics {
        let m = self.current;
        self.current = EarthMetrics {
            co2_level: m.co2_level + delta.co2_level,
            toxicity_level: m.toxicity_level + delta.toxicity_level,
            temperature: m.temperature + delta.temperature,
            human_population: m.human_population.saturating_add_signed(delta.human_population),
            animal_population: m
                .animal_population
                .saturating_add_signed(delta.animal_population),
            plant_population: m.plant_population.saturating_add_signed(delta.plant_population),
            ocean_acidity: m.ocean_acidity + delta.ocean_acidity,
            ice_cap_melting: m.ice_cap_melting + delta.ice_cap_melting,
        }
        .clamped();
        self.current
    }

    /// Unconditionally replace the metrics, still clamping each field.
    pub fn replace(&mut self, metrics: EarthMetrics) -> EarthMetrics {
        self.current = metrics.clamped();
        self.current
    }

    /// Restore the initial row.
    pub const fn reset(&mut self) -> EarthMetrics {
        self.current = EarthMetrics::INITIAL;
        self.current
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}
