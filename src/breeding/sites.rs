//! Breeding-site registry
//!
//! Permanent sites are the water cells of the static map and never expire.
//! Temporary sites are spawned by rainfall at random cells, carry a
//! remaining lifetime, are refreshed (not duplicated) when rained on again,
//! and take their resident egg batches with them when they expire.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::BreedingConfig;
use crate::core::types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteKind {
    Permanent,
    Temporary { remaining_days: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingSite {
    pub cell: Coord,
    pub kind: SiteKind,
}

/// Registry of all active breeding sites, in insertion order
pub struct SiteRegistry {
    sites: Vec<BreedingSite>,
}

impl SiteRegistry {
    pub fn from_permanent_cells(cells: &[Coord]) -> Self {
        Self {
            sites: cells
                .iter()
                .map(|&cell| BreedingSite { cell, kind: SiteKind::Permanent })
                .collect(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.sites.len()
    }

    pub fn sites(&self) -> &[BreedingSite] {
        &self.sites
    }

    pub fn is_site(&self, cell: Coord) -> bool {
        self.sites.iter().any(|s| s.cell == cell)
    }

    /// Spawn or refresh temporary sites from today's precipitation.
    ///
    /// `ceil(precipitation * sites_per_mm)` candidate cells are drawn
    /// uniformly; rain on an existing temporary site resets its lifetime,
    /// rain on a permanent site or a fresh cell behaves as expected.
    pub fn rainfall_update<R: Rng>(
        &mut self,
        precipitation: f64,
        config: &BreedingConfig,
        width: i32,
        height: i32,
        rng: &mut R,
    ) {
        if precipitation <= config.rainfall_threshold_mm {
            return;
        }
        let spawn_count = (precipitation * config.sites_per_mm).ceil() as u32;
        let lifetime = config.temporary_site_lifetime_days;
        for _ in 0..spawn_count {
            let cell = Coord::new(rng.gen_range(0..width), rng.gen_range(0..height));
            match self.sites.iter_mut().find(|s| s.cell == cell) {
                Some(site) => {
                    if let SiteKind::Temporary { remaining_days } = &mut site.kind {
                        *remaining_days = lifetime;
                    }
                    // Permanent sites are unaffected by rain.
                }
                None => self.sites.push(BreedingSite {
                    cell,
                    kind: SiteKind::Temporary { remaining_days: lifetime },
                }),
            }
        }
    }

    /// Age all temporary sites by one day and remove the expired ones.
    ///
    /// Returns the cells that expired so the caller can purge their egg
    /// batches (eggs do not survive site disappearance).
    pub fn tick_expiry(&mut self) -> Vec<Coord> {
        let mut expired = Vec::new();
        for site in &mut self.sites {
            if let SiteKind::Temporary { remaining_days } = &mut site.kind {
                *remaining_days -= 1;
                if *remaining_days == 0 {
                    expired.push(site.cell);
                }
            }
        }
        self.sites
            .retain(|s| !matches!(s.kind, SiteKind::Temporary { remaining_days: 0 }));
        expired
    }

    /// Nearest site within Chebyshev `range` of `from`; ties break on the
    /// lower coordinate so the answer never depends on registry history.
    pub fn nearest_within(&self, from: Coord, range: i32) -> Option<Coord> {
        self.sites
            .iter()
            .map(|s| s.cell)
            .filter(|cell| from.chebyshev(*cell) <= range)
            .min_by_key(|cell| (from.chebyshev(*cell), cell.x, cell.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn breeding_config() -> BreedingConfig {
        crate::core::config::SimulationConfig::default().breeding
    }

    #[test]
    fn permanent_sites_never_expire() {
        let mut registry =
            SiteRegistry::from_permanent_cells(&[Coord::new(1, 1), Coord::new(2, 2)]);
        for _ in 0..100 {
            assert!(registry.tick_expiry().is_empty());
        }
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn rainfall_spawns_and_expiry_removes_temporaries() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = breeding_config();
        let mut registry = SiteRegistry::from_permanent_cells(&[]);

        registry.rainfall_update(20.0, &config, 50, 50, &mut rng);
        let spawned = registry.active_count();
        assert!(spawned > 0, "20mm over a 5mm threshold must spawn sites");

        // Lifetime is 7 days; nothing expires before that.
        for _ in 0..6 {
            assert!(registry.tick_expiry().is_empty());
        }
        let expired = registry.tick_expiry();
        assert_eq!(expired.len(), spawned);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn rain_refreshes_an_existing_temporary_site() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let config = breeding_config();
        let mut registry = SiteRegistry::from_permanent_cells(&[]);

        // 1x1 grid forces every spawn onto the same cell.
        registry.rainfall_update(50.0, &config, 1, 1, &mut rng);
        assert_eq!(registry.active_count(), 1, "same cell must not duplicate");

        registry.tick_expiry();
        registry.tick_expiry();
        registry.rainfall_update(50.0, &config, 1, 1, &mut rng);
        match registry.sites()[0].kind {
            SiteKind::Temporary { remaining_days } => {
                assert_eq!(remaining_days, config.temporary_site_lifetime_days)
            }
            SiteKind::Permanent => panic!("expected a temporary site"),
        }
    }

    #[test]
    fn below_threshold_rain_spawns_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = breeding_config();
        let mut registry = SiteRegistry::from_permanent_cells(&[]);
        registry.rainfall_update(config.rainfall_threshold_mm, &config, 50, 50, &mut rng);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn nearest_site_respects_range_and_breaks_ties_deterministically() {
        let registry = SiteRegistry::from_permanent_cells(&[
            Coord::new(8, 0),
            Coord::new(0, 8),
            Coord::new(20, 20),
        ]);
        let from = Coord::new(4, 4);
        // Both near sites are at Chebyshev distance 4; (0, 8) wins on x.
        assert_eq!(registry.nearest_within(from, 5), Some(Coord::new(0, 8)));
        assert_eq!(registry.nearest_within(from, 3), None);
    }
}
