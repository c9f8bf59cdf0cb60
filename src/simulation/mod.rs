//! Daily orchestrator
//!
//! One `Simulation` owns the whole model state: grid, site registry, larval
//! ledger, both agent populations, control state, and the run's single RNG
//! stream. `step_day` runs the strictly-ordered daily sequence:
//!
//! 1. advance the calendar and fetch today's climate;
//! 2. update breeding sites from precipitation, expire old ones;
//! 3. advance the larval ledger and emerge new adults;
//! 4. activate every host and vector in a freshly shuffled combined order;
//! 5. apply scheduled control strategies;
//! 6. snapshot metrics.
//!
//! Agents are logically simultaneous but activated sequentially in shuffled
//! order so no agent is systematically favored. All randomness flows through
//! the one seeded `ChaCha8Rng`, consumed in a fixed order, so identical seed
//! and inputs give identical trajectories.

use ahash::{AHashMap, AHashSet};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agents::host::{HealthState, HostAgent, MobilityKind};
use crate::agents::vector::{VectorAgent, VectorState};
use crate::breeding::ledger::LarvalLedger;
use crate::breeding::sites::SiteRegistry;
use crate::climate::{ClimateProvider, DailyClimate, SyntheticClimate};
use crate::control::ControlState;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Coord, Day};
use crate::metrics::DailyMetrics;
use crate::spatial::cell_map::CellMap;
use crate::spatial::grid::AgentGrid;
use crate::transmission::{self, BiteOutcome};

/// One entry in the day's shuffled activation order
#[derive(Debug, Clone, Copy)]
enum Activation {
    Host(usize),
    Vector(usize),
}

pub struct Simulation {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    day: Day,
    cell_map: CellMap,
    grid: AgentGrid,
    sites: SiteRegistry,
    ledger: LarvalLedger,
    hosts: Vec<HostAgent>,
    vectors: Vec<VectorAgent>,
    host_index: AHashMap<AgentId, usize>,
    vector_index: AHashMap<AgentId, usize>,
    control: ControlState,
    fallback: SyntheticClimate,
    next_id: u64,
    last_metrics: Option<DailyMetrics>,
}

impl Simulation {
    /// Build and seed a simulation. Fails fast on configuration errors.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let cell_map = CellMap::generate(&config.grid, &mut rng);
        let grid = AgentGrid::new(config.grid.width, config.grid.height);
        let sites = SiteRegistry::from_permanent_cells(cell_map.water_cells());

        let mut sim = Self {
            config,
            rng,
            day: 0,
            cell_map,
            grid,
            sites,
            ledger: LarvalLedger::new(),
            hosts: Vec::new(),
            vectors: Vec::new(),
            host_index: AHashMap::new(),
            vector_index: AHashMap::new(),
            control: ControlState::new(),
            fallback: SyntheticClimate::default(),
            next_id: 0,
            last_metrics: None,
        };
        sim.seed_hosts();
        sim.seed_vectors();
        sim.seed_initial_eggs();
        tracing::info!(
            hosts = sim.hosts.len(),
            vectors = sim.vectors.len(),
            eggs = sim.ledger.total_count(),
            permanent_sites = sim.sites.active_count(),
            "simulation initialized"
        );
        Ok(sim)
    }

    fn next_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_cell(&mut self) -> Coord {
        Coord::new(
            self.rng.gen_range(0..self.grid.width()),
            self.rng.gen_range(0..self.grid.height()),
        )
    }

    /// A home or destination cell: urban when the map has any, else anywhere
    fn random_urban_cell(&mut self) -> Coord {
        if self.cell_map.urban_cells().is_empty() {
            return self.random_cell();
        }
        let idx = self.rng.gen_range(0..self.cell_map.urban_cells().len());
        self.cell_map.urban_cells()[idx]
    }

    fn seed_hosts(&mut self) {
        let population = self.config.population.clone();
        let mix = population.archetype_mix;
        for i in 0..population.hosts {
            let roll: f64 = self.rng.gen();
            let mobility = if roll < mix.student {
                MobilityKind::Student
            } else if roll < mix.student + mix.worker {
                MobilityKind::Worker
            } else if roll < mix.student + mix.worker + mix.roamer {
                MobilityKind::Roamer
            } else {
                MobilityKind::Stationary
            };
            let home = self.random_urban_cell();
            let destination = match mobility {
                MobilityKind::Student | MobilityKind::Worker => Some(self.random_urban_cell()),
                _ => None,
            };
            let id = self.next_agent_id();
            let mut host = HostAgent::new(
                id,
                home,
                destination,
                mobility,
                &self.config.host_disease,
                &mut self.rng,
            );
            if i < population.initial_infectious_hosts {
                host.state = HealthState::Infectious;
            }
            self.grid.place(id, home);
            self.host_index.insert(id, self.hosts.len());
            self.hosts.push(host);
        }
    }

    fn seed_vectors(&mut self) {
        for i in 0..self.config.population.vectors {
            let cell = self.random_cell();
            let id = self.next_agent_id();
            let mut vector = VectorAgent::new(id, cell, &self.config.vector, &mut self.rng);
            if i < self.config.population.initial_infected_vectors {
                vector.infect();
            }
            self.grid.place(id, cell);
            self.vector_index.insert(id, self.vectors.len());
            self.vectors.push(vector);
        }
    }

    fn seed_initial_eggs(&mut self) {
        let eggs = self.config.population.initial_eggs;
        if eggs == 0 {
            return;
        }
        if self.cell_map.water_cells().is_empty() {
            tracing::warn!("no permanent breeding sites; initial egg cohort skipped");
            return;
        }
        for _ in 0..eggs {
            let idx = self.rng.gen_range(0..self.cell_map.water_cells().len());
            let site = self.cell_map.water_cells()[idx];
            self.ledger.add(site, 1, 0, &self.config.breeding);
        }
    }

    /// Run one simulated day. A mid-day invariant violation aborts the run;
    /// no day is ever partially applied and silently continued.
    pub fn step_day(&mut self, provider: &dyn ClimateProvider) -> Result<DailyMetrics> {
        self.day += 1;
        let day = self.day;

        // 1. Climate, with the documented synthetic fallback.
        let (climate, climate_fallback) = match provider.climate_for(day) {
            Some(climate) => (climate, false),
            None => {
                tracing::warn!(day, "climate provider has no data; using synthetic fallback");
                (self.fallback.generate(day), true)
            }
        };

        // 2. Breeding sites: rainfall spawning, then expiry with egg purge.
        let (width, height) = (self.grid.width(), self.grid.height());
        self.sites.rainfall_update(
            climate.precipitation,
            &self.config.breeding,
            width,
            height,
            &mut self.rng,
        );
        for expired in self.sites.tick_expiry() {
            self.ledger.purge_site(expired);
        }

        // 3. Larval development and adult emergence.
        let cohorts =
            self.ledger
                .advance(climate.mean_temperature, &self.config.breeding, &mut self.rng);
        for cohort in cohorts {
            for _ in 0..cohort.count {
                let id = self.next_agent_id();
                let vector = VectorAgent::new(id, cohort.site, &self.config.vector, &mut self.rng);
                self.grid.place(id, cohort.site);
                self.vector_index.insert(id, self.vectors.len());
                self.vectors.push(vector);
            }
        }

        // 4. Combined shuffled activation.
        let mut order: Vec<Activation> = (0..self.hosts.len())
            .map(Activation::Host)
            .chain((0..self.vectors.len()).map(Activation::Vector))
            .collect();
        order.shuffle(&mut self.rng);

        let mut dead: AHashSet<AgentId> = AHashSet::new();
        for entry in order {
            match entry {
                Activation::Host(i) => self.activate_host(i),
                Activation::Vector(i) => self.activate_vector(i, day, &mut dead)?,
            }
        }
        if !dead.is_empty() {
            self.vectors.retain(|v| !dead.contains(&v.id));
            self.vector_index = self
                .vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (v.id, i))
                .collect();
        }

        // 5. Scheduled control strategies.
        let mut lsm_applied = false;
        if self.control.lsm_due(&self.config.control, day) {
            self.apply_lsm_now();
            lsm_applied = true;
        }
        self.control.note_lsm_applied(lsm_applied);
        if self.config.control.itn_irs.enabled && day == 1 {
            self.activate_itn_irs();
        }
        self.control.expire(day);

        self.check_grid_sync(day)?;

        // 6. Metrics snapshot.
        let metrics = self.snapshot(climate, climate_fallback);
        tracing::debug!(
            day,
            infectious = metrics.hosts_infectious,
            infected_vectors = metrics.vectors_infected,
            larvae = metrics.larval_count,
            "day complete"
        );
        self.last_metrics = Some(metrics.clone());
        Ok(metrics)
    }

    /// Convenience driver: run `days` consecutive days
    pub fn run(&mut self, days: u32, provider: &dyn ClimateProvider) -> Result<Vec<DailyMetrics>> {
        let mut history = Vec::with_capacity(days as usize);
        for _ in 0..days {
            history.push(self.step_day(provider)?);
        }
        Ok(history)
    }

    fn activate_host(&mut self, idx: usize) {
        self.hosts[idx].advance_disease(&self.config.host_disease, &mut self.rng);
        let destination = self.hosts[idx].choose_destination(
            &self.config.population,
            &self.config.host_disease,
            &self.cell_map,
            self.grid.width(),
            self.grid.height(),
            &mut self.rng,
        );
        let id = self.hosts[idx].id;
        self.grid.relocate(id, destination);
        self.hosts[idx].cell = destination;
    }

    fn activate_vector(
        &mut self,
        idx: usize,
        day: Day,
        dead: &mut AHashSet<AgentId>,
    ) -> Result<()> {
        let id = self.vectors[idx].id;
        self.vectors[idx].age_days += 1;
        self.vectors[idx].bitten_today = false;
        self.vectors[idx].days_since_oviposition += 1;

        // Mortality first: a dead vector leaves the grid immediately and
        // does nothing else today. The collection is compacted after the
        // activation sweep.
        if !self.vectors[idx].survives_today(&mut self.rng) {
            self.grid.remove(id);
            dead.insert(id);
            return Ok(());
        }

        // Movement: one step toward the nearest sensed host, else a random
        // Moore step.
        let current = self.vectors[idx].cell;
        let sensed = self.nearest_host_cell(current, day)?;
        let new_cell = match sensed {
            Some(target) => current.step_toward(target, self.grid.width(), self.grid.height()),
            None => {
                let neighbors = self.grid.neighbors(current);
                match neighbors.choose(&mut self.rng) {
                    Some(&cell) => cell,
                    None => current,
                }
            }
        };
        self.grid.relocate(id, new_cell);
        self.vectors[idx].cell = new_cell;

        // At most one bite attempt per day, against a uniformly chosen
        // co-located host.
        let mut candidates = Vec::new();
        for &other in self.grid.agents_in(new_cell) {
            if let Some(&host_idx) = self.host_index.get(&other) {
                candidates.push(host_idx);
            } else if !self.vector_index.contains_key(&other) {
                return Err(SimError::InvariantViolation {
                    day,
                    detail: format!("agent {other:?} on grid at {new_cell:?} belongs to no population"),
                });
            }
        }
        if let Some(&host_idx) = candidates.choose(&mut self.rng) {
            self.vectors[idx].bitten_today = true;
            let home_protected = self.control.is_protected(self.hosts[host_idx].home, day);
            let outcome = transmission::resolve_bite(
                self.vectors[idx].state,
                self.hosts[host_idx].state,
                home_protected,
                self.config.control.itn_irs.bite_reduction,
                &self.config.transmission,
                &mut self.rng,
            );
            match outcome {
                BiteOutcome::HostExposed => self.hosts[host_idx].expose(),
                BiteOutcome::VectorInfected => self.vectors[idx].infect(),
                BiteOutcome::Blocked | BiteOutcome::NoTransmission => {}
            }
            if outcome.is_blood_meal() {
                self.vectors[idx].has_fed = true;
            }
        }

        self.vectors[idx].try_mating(&mut self.rng);

        // Oviposition: nearest reachable site takes the female fraction of
        // the clutch; no reachable site leaves the cycle state untouched.
        if self.vectors[idx].ready_to_oviposit(self.config.vector.gonotrophic_cycle_days) {
            if let Some(site) = self
                .sites
                .nearest_within(self.vectors[idx].cell, self.config.vector.flight_range)
            {
                let eggs = (f64::from(self.config.vector.eggs_per_clutch)
                    * self.config.vector.female_ratio)
                    .round() as u32;
                self.ledger.add(site, eggs, day, &self.config.breeding);
                self.vectors[idx].record_oviposition();
            }
        }
        Ok(())
    }

    /// Cell of the nearest host within sensory range, ties broken by id so
    /// the answer is independent of grid scan order
    fn nearest_host_cell(&self, from: Coord, day: Day) -> Result<Option<Coord>> {
        let range = self.config.vector.sensory_range;
        if range == 0 {
            return Ok(None);
        }
        let mut best: Option<(i32, AgentId, Coord)> = None;
        for id in self.grid.agents_in_radius(from, range) {
            let Some(&host_idx) = self.host_index.get(&id) else {
                if self.vector_index.contains_key(&id) {
                    continue;
                }
                return Err(SimError::InvariantViolation {
                    day,
                    detail: format!("agent {id:?} on grid near {from:?} belongs to no population"),
                });
            };
            let cell = self.hosts[host_idx].cell;
            let key = (from.chebyshev(cell), id, cell);
            if best.map_or(true, |b| (key.0, key.1) < (b.0, b.1)) {
                best = Some(key);
            }
        }
        Ok(best.map(|(_, _, cell)| cell))
    }

    /// Entry point for the LSM strategy: act on the ledger immediately
    pub fn apply_lsm_now(&mut self) {
        let lsm = self.config.control.lsm.clone();
        let before = self.ledger.total_count();
        self.ledger.apply_lsm(lsm.coverage, lsm.effectiveness, &mut self.rng);
        tracing::debug!(
            day = self.day,
            destroyed = before - self.ledger.total_count(),
            "larval source management applied"
        );
    }

    /// Entry point for ITN/IRS drivers: protect one home through `until_day`
    pub fn protect_home(&mut self, home: Coord, until_day: Day) {
        self.control.protect_home(home, until_day);
    }

    pub fn unprotect_home(&mut self, home: Coord) {
        self.control.unprotect_home(home);
    }

    /// Config-driven ITN/IRS activation: a coverage sample of host homes,
    /// protected for the configured duration
    fn activate_itn_irs(&mut self) {
        let itn = self.config.control.itn_irs.clone();
        let until = self.day + itn.duration_days.saturating_sub(1);
        let mut seen = AHashSet::new();
        let homes: Vec<Coord> = self
            .hosts
            .iter()
            .map(|h| h.home)
            .filter(|home| seen.insert(*home))
            .collect();
        let mut protected = 0u32;
        for home in homes {
            if self.rng.gen_bool(itn.coverage) {
                self.control.protect_home(home, until);
                protected += 1;
            }
        }
        tracing::info!(day = self.day, protected, until, "ITN/IRS protection activated");
    }

    /// Grid and population collections must describe the same world
    fn check_grid_sync(&self, day: Day) -> Result<()> {
        let expected = self.hosts.len() + self.vectors.len();
        if self.grid.occupant_count() != expected {
            return Err(SimError::InvariantViolation {
                day,
                detail: format!(
                    "grid holds {} agents but populations hold {}",
                    self.grid.occupant_count(),
                    expected
                ),
            });
        }
        Ok(())
    }

    fn snapshot(&self, climate: DailyClimate, climate_fallback: bool) -> DailyMetrics {
        let mut metrics = DailyMetrics {
            day: self.day,
            hosts_susceptible: 0,
            hosts_exposed: 0,
            hosts_infectious: 0,
            hosts_recovered: 0,
            vectors_susceptible: 0,
            vectors_infected: 0,
            larval_count: self.ledger.total_count(),
            active_breeding_sites: self.sites.active_count() as u32,
            mean_temperature: climate.mean_temperature,
            precipitation: climate.precipitation,
            climate_fallback,
            lsm_applied: self.control.lsm_applied_today(),
            protected_homes: self.control.protected_home_count() as u32,
        };
        for host in &self.hosts {
            match host.state {
                HealthState::Susceptible => metrics.hosts_susceptible += 1,
                HealthState::Exposed => metrics.hosts_exposed += 1,
                HealthState::Infectious => metrics.hosts_infectious += 1,
                HealthState::Recovered => metrics.hosts_recovered += 1,
            }
        }
        for vector in &self.vectors {
            match vector.state {
                VectorState::Susceptible => metrics.vectors_susceptible += 1,
                VectorState::Infected => metrics.vectors_infected += 1,
            }
        }
        metrics
    }

    // Read-only queries for external collaborators and tests.

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn last_metrics(&self) -> Option<&DailyMetrics> {
        self.last_metrics.as_ref()
    }

    pub fn hosts(&self) -> &[HostAgent] {
        &self.hosts
    }

    pub fn vectors(&self) -> &[VectorAgent] {
        &self.vectors
    }

    pub fn ledger(&self) -> &LarvalLedger {
        &self.ledger
    }

    pub fn sites(&self) -> &SiteRegistry {
        &self.sites
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
