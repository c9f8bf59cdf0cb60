//! Larval population ledger
//!
//! Immature vectors are never individual agents. Eggs laid at the same site
//! on the same day merge into one batch, so the number of live entries is
//! bounded by sites x active cohort days instead of total eggs. Development
//! follows the accumulated degree-day model of Tun-Lin et al. (1999): a
//! batch hatches once its thermal units reach the configured constant.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::BreedingConfig;
use crate::core::types::{Coord, Day};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggBatch {
    pub site: Coord,
    pub count: u32,
    pub thermal_units: f64,
    pub days_since_laid: u32,
    pub laid_on: Day,
}

/// A batch that completed development: `count` adults emerge at `site`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergedCohort {
    pub site: Coord,
    pub count: u32,
}

#[derive(Default)]
pub struct LarvalLedger {
    batches: Vec<EggBatch>,
}

impl LarvalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add eggs at a site, merging with the batch laid there today.
    ///
    /// With a site capacity configured, eggs beyond the standing count are
    /// silently discarded — larval competition, not an error.
    pub fn add(&mut self, site: Coord, count: u32, today: Day, config: &BreedingConfig) {
        if count == 0 {
            return;
        }
        let count = match config.site_capacity {
            Some(cap) => {
                let standing = self.count_at(site);
                count.min(cap.saturating_sub(standing))
            }
            None => count,
        };
        if count == 0 {
            return;
        }
        if let Some(batch) = self
            .batches
            .iter_mut()
            .find(|b| b.site == site && b.laid_on == today)
        {
            batch.count += count;
            return;
        }
        self.batches.push(EggBatch {
            site,
            count,
            thermal_units: 0.0,
            days_since_laid: 0,
            laid_on: today,
        });
    }

    /// Advance all batches by one day.
    ///
    /// Order matters: thermal accumulation, then mortality, then hatching,
    /// so a batch can be thinned on the very day it would emerge. Returns
    /// the cohorts that completed development, in ledger (lay) order.
    pub fn advance<R: Rng>(
        &mut self,
        mean_temperature: f64,
        config: &BreedingConfig,
        rng: &mut R,
    ) -> Vec<EmergedCohort> {
        let degree_units = (mean_temperature - config.thermal_base_c).max(0.0);

        for batch in &mut self.batches {
            batch.thermal_units += degree_units;
            batch.days_since_laid += 1;
        }

        if config.egg_daily_mortality > 0.0 {
            for batch in &mut self.batches {
                batch.count -= stochastic_round(
                    f64::from(batch.count) * config.egg_daily_mortality,
                    rng,
                )
                .min(batch.count);
            }
            self.batches.retain(|b| b.count > 0);
        }

        let mut emerged = Vec::new();
        self.batches.retain(|batch| {
            if batch.thermal_units >= config.thermal_constant {
                emerged.push(EmergedCohort { site: batch.site, count: batch.count });
                false
            } else {
                true
            }
        });
        emerged
    }

    /// Larval source management: coverage x effectiveness destroys a batch
    /// outright; a covered-but-not-destroyed batch loses the effectiveness
    /// fraction of its count.
    pub fn apply_lsm<R: Rng>(&mut self, coverage: f64, effectiveness: f64, rng: &mut R) {
        let full_kill = coverage * effectiveness;
        self.batches.retain_mut(|batch| {
            if rng.gen_bool(full_kill) {
                return false;
            }
            if rng.gen_bool(coverage) {
                batch.count -= (f64::from(batch.count) * effectiveness) as u32;
            }
            batch.count > 0
        });
    }

    /// Delete every batch at an expired site
    pub fn purge_site(&mut self, site: Coord) {
        self.batches.retain(|b| b.site != site);
    }

    pub fn total_count(&self) -> u64 {
        self.batches.iter().map(|b| u64::from(b.count)).sum()
    }

    pub fn count_at(&self, site: Coord) -> u32 {
        self.batches
            .iter()
            .filter(|b| b.site == site)
            .map(|b| b.count)
            .sum()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn batches(&self) -> &[EggBatch] {
        &self.batches
    }
}

/// Integer deaths from an expected value: take the floor, then one more
/// with probability equal to the fractional part (as the reference model
/// does, keeping expectation exact for small batches).
fn stochastic_round<R: Rng>(expected: f64, rng: &mut R) -> u32 {
    let whole = expected.floor();
    let fraction = expected - whole;
    whole as u32 + u32::from(fraction > 0.0 && rng.gen_bool(fraction))
}
