//! Daily climate inputs
//!
//! The orchestrator treats climate as a pure function of the simulated day.
//! A provider may report "no data" for a day; the simulation then falls back
//! to [`SyntheticClimate`], logs the substitution, and flags it in that day's
//! metrics. Acquisition of real weather data (CSV parsing etc.) is the
//! concern of an external collaborator implementing [`ClimateProvider`].

use serde::{Deserialize, Serialize};

use crate::core::types::Day;

/// One day's climate inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClimate {
    /// Daily mean temperature in degrees Celsius
    pub mean_temperature: f64,
    /// Daily precipitation in millimeters
    pub precipitation: f64,
}

pub trait ClimateProvider {
    /// Climate for a simulated day, or `None` when the provider has no data
    fn climate_for(&self, day: Day) -> Option<DailyClimate>;
}

/// In-memory day-indexed climate series
///
/// Day 1 maps to the first entry. Useful for tests and for drivers that load
/// a series elsewhere and hand it to the simulation.
pub struct ClimateTable {
    series: Vec<DailyClimate>,
}

impl ClimateTable {
    pub fn from_series(series: Vec<DailyClimate>) -> Self {
        Self { series }
    }

    /// A constant-weather table, convenient in tests
    pub fn constant(temperature: f64, precipitation: f64, days: usize) -> Self {
        Self {
            series: vec![
                DailyClimate { mean_temperature: temperature, precipitation };
                days
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl ClimateProvider for ClimateTable {
    fn climate_for(&self, day: Day) -> Option<DailyClimate> {
        if day == 0 {
            return None;
        }
        self.series.get(day as usize - 1).copied()
    }
}

/// Documented fallback: a deterministic sinusoidal annual cycle.
///
/// Tropical defaults: mean 25 C with a 3 C seasonal swing, and a wet season
/// whose precipitation peaks half a year out of phase with temperature.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticClimate {
    pub mean_temperature: f64,
    pub temperature_amplitude: f64,
    pub mean_precipitation: f64,
    pub precipitation_amplitude: f64,
}

impl Default for SyntheticClimate {
    fn default() -> Self {
        Self {
            mean_temperature: 25.0,
            temperature_amplitude: 3.0,
            mean_precipitation: 4.0,
            precipitation_amplitude: 4.0,
        }
    }
}

impl SyntheticClimate {
    /// Always yields a value; pure in the day number
    pub fn generate(&self, day: Day) -> DailyClimate {
        let phase = 2.0 * std::f64::consts::PI * f64::from(day) / 365.0;
        let temperature = self.mean_temperature + self.temperature_amplitude * phase.sin();
        let precipitation =
            (self.mean_precipitation - self.precipitation_amplitude * phase.sin()).max(0.0);
        DailyClimate { mean_temperature: temperature, precipitation }
    }
}

impl ClimateProvider for SyntheticClimate {
    fn climate_for(&self, day: Day) -> Option<DailyClimate> {
        Some(self.generate(day))
    }
}
