//! Daily metrics snapshot
//!
//! Emitted once at the end of every simulated day; the only view external
//! collaborators get into the run. Equality over a sequence of snapshots is
//! how determinism is asserted in tests.

use serde::{Deserialize, Serialize};

use crate::core::types::Day;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub day: Day,
    pub hosts_susceptible: u32,
    pub hosts_exposed: u32,
    pub hosts_infectious: u32,
    pub hosts_recovered: u32,
    pub vectors_susceptible: u32,
    pub vectors_infected: u32,
    pub larval_count: u64,
    pub active_breeding_sites: u32,
    pub mean_temperature: f64,
    pub precipitation: f64,
    /// The climate provider had no data and the synthetic fallback was used
    pub climate_fallback: bool,
    pub lsm_applied: bool,
    pub protected_homes: u32,
}

impl DailyMetrics {
    pub fn total_hosts(&self) -> u32 {
        self.hosts_susceptible + self.hosts_exposed + self.hosts_infectious + self.hosts_recovered
    }

    pub fn total_vectors(&self) -> u32 {
        self.vectors_susceptible + self.vectors_infected
    }
}
