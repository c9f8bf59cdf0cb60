//! Static cell-type map
//!
//! Land use is fixed at initialization: water and park cells are placed as
//! contiguous rectangular zones (not isolated cells), everything else is
//! urban. Per-kind coordinate lists are cached because mobility and
//! site-seeking logic sample them every day.

use rand::Rng;

use crate::core::config::{DurationRange, GridConfig};
use crate::core::types::{CellKind, Coord};

pub struct CellMap {
    width: i32,
    height: i32,
    kinds: Vec<CellKind>,
    urban: Vec<Coord>,
    parks: Vec<Coord>,
    water: Vec<Coord>,
}

// Zone placement gives up after enough rejected rectangles; a slightly
// under-filled map is acceptable, a non-terminating loop is not.
const MAX_TOTAL_ATTEMPTS: u32 = 500;
const MAX_CONSECUTIVE_FAILURES: u32 = 50;

impl CellMap {
    pub fn generate<R: Rng>(config: &GridConfig, rng: &mut R) -> Self {
        let (width, height) = (config.width as i32, config.height as i32);
        let total = (width * height) as f64;
        let mut kinds = vec![CellKind::Urban; (width * height) as usize];

        let water_target = (total * config.water_ratio) as u32;
        let park_target = (total * config.park_ratio) as u32;

        place_zones(
            &mut kinds,
            width,
            height,
            CellKind::Water,
            water_target,
            config.water_zone_size,
            rng,
        );
        place_zones(
            &mut kinds,
            width,
            height,
            CellKind::Park,
            park_target,
            config.park_zone_size,
            rng,
        );

        let mut urban = Vec::new();
        let mut parks = Vec::new();
        let mut water = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let cell = Coord::new(x, y);
                match kinds[(y * width + x) as usize] {
                    CellKind::Urban => urban.push(cell),
                    CellKind::Park => parks.push(cell),
                    CellKind::Water => water.push(cell),
                }
            }
        }

        Self { width, height, kinds, urban, parks, water }
    }

    pub fn kind(&self, cell: Coord) -> CellKind {
        assert!(
            cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height,
            "coordinate {cell:?} outside {}x{} map",
            self.width,
            self.height
        );
        self.kinds[(cell.y * self.width + cell.x) as usize]
    }

    /// Urban cells, in row-major order (hosts live and work here)
    pub fn urban_cells(&self) -> &[Coord] {
        &self.urban
    }

    pub fn park_cells(&self) -> &[Coord] {
        &self.parks
    }

    /// Water cells become the permanent breeding sites
    pub fn water_cells(&self) -> &[Coord] {
        &self.water
    }
}

fn place_zones<R: Rng>(
    kinds: &mut [CellKind],
    width: i32,
    height: i32,
    kind: CellKind,
    target_cells: u32,
    zone_size: DurationRange,
    rng: &mut R,
) {
    let mut assigned = 0u32;
    let mut attempts = 0u32;
    let mut consecutive_failures = 0u32;

    while assigned < target_cells && attempts < MAX_TOTAL_ATTEMPTS {
        attempts += 1;
        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            break;
        }

        let zone_w = rng.gen_range(zone_size.min..=zone_size.max) as i32;
        let zone_h = rng.gen_range(zone_size.min..=zone_size.max) as i32;
        if zone_w >= width || zone_h >= height {
            consecutive_failures += 1;
            continue;
        }

        let ox = rng.gen_range(0..width - zone_w);
        let oy = rng.gen_range(0..height - zone_h);

        // Reject rectangles that touch anything already non-urban.
        let overlaps = (0..zone_h).any(|dy| {
            (0..zone_w).any(|dx| kinds[((oy + dy) * width + ox + dx) as usize] != CellKind::Urban)
        });
        if overlaps {
            consecutive_failures += 1;
            continue;
        }

        consecutive_failures = 0;
        'zone: for dy in 0..zone_h {
            for dx in 0..zone_w {
                kinds[((oy + dy) * width + ox + dx) as usize] = kind;
                assigned += 1;
                if assigned >= target_cells {
                    break 'zone;
                }
            }
        }
    }

    if assigned < target_cells {
        tracing::warn!(
            ?kind,
            assigned,
            target_cells,
            "zone placement gave up before reaching target"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_config() -> GridConfig {
        GridConfig {
            width: 50,
            height: 50,
            water_ratio: 0.05,
            park_ratio: 0.10,
            water_zone_size: DurationRange { min: 2, max: 4 },
            park_zone_size: DurationRange { min: 3, max: 6 },
        }
    }

    #[test]
    fn generated_map_partitions_the_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let map = CellMap::generate(&test_config(), &mut rng);
        let total = map.urban_cells().len() + map.park_cells().len() + map.water_cells().len();
        assert_eq!(total, 2500);
        assert!(!map.water_cells().is_empty(), "water zones should exist");
        assert!(!map.park_cells().is_empty(), "park zones should exist");
    }

    #[test]
    fn cached_lists_agree_with_kind_lookup() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let map = CellMap::generate(&test_config(), &mut rng);
        for &cell in map.water_cells() {
            assert_eq!(map.kind(cell), CellKind::Water);
        }
        for &cell in map.park_cells() {
            assert_eq!(map.kind(cell), CellKind::Park);
        }
    }

    #[test]
    fn same_seed_generates_same_map() {
        let map_a = CellMap::generate(&test_config(), &mut ChaCha8Rng::seed_from_u64(99));
        let map_b = CellMap::generate(&test_config(), &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(map_a.water_cells(), map_b.water_cells());
        assert_eq!(map_a.park_cells(), map_b.park_cells());
    }
}
