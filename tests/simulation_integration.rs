//! Integration tests driving full simulation runs

use std::collections::HashSet;

use vectorsim::climate::{ClimateTable, SyntheticClimate};
use vectorsim::core::config::{DurationRange, SimulationConfig};
use vectorsim::core::types::AgentId;
use vectorsim::simulation::Simulation;

/// A scaled-down but otherwise default scenario that runs fast in tests
fn small_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.seed = seed;
    config.grid.width = 30;
    config.grid.height = 30;
    config.population.hosts = 200;
    config.population.vectors = 400;
    config.population.initial_eggs = 200;
    config.population.initial_infectious_hosts = 5;
    config.population.initial_infected_vectors = 3;
    config
}

/// 1x1 world: every agent shares the single cell, so interactions are forced
fn single_cell_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.seed = seed;
    config.grid.width = 1;
    config.grid.height = 1;
    config.grid.water_ratio = 0.0;
    config.grid.park_ratio = 0.0;
    config.population.hosts = 1;
    config.population.vectors = 1;
    config.population.initial_eggs = 0;
    config.population.initial_infectious_hosts = 1;
    config.population.initial_infected_vectors = 0;
    config.vector.mortality_rate = 0.0;
    config.vector.parameter_jitter = 0.0;
    config.host_disease.infectious_days = DurationRange::fixed(10);
    config
}

#[test]
fn identical_seeds_give_identical_metric_sequences() {
    let climate = SyntheticClimate::default();

    let mut sim_a = Simulation::new(small_config(1234)).unwrap();
    let mut sim_b = Simulation::new(small_config(1234)).unwrap();

    let history_a = sim_a.run(30, &climate).unwrap();
    let history_b = sim_b.run(30, &climate).unwrap();

    assert_eq!(history_a, history_b, "same seed must reproduce the run exactly");
}

#[test]
fn host_population_is_conserved() {
    let climate = SyntheticClimate::default();
    let mut sim = Simulation::new(small_config(7)).unwrap();
    for _ in 0..60 {
        let metrics = sim.step_day(&climate).unwrap();
        assert_eq!(metrics.total_hosts(), 200, "hosts neither die nor appear");
    }
}

#[test]
fn certain_bite_infects_the_vector_in_one_day() {
    let mut config = single_cell_config(11);
    config.transmission.host_to_vector = 1.0;

    let climate = ClimateTable::constant(25.0, 0.0, 10);
    let mut sim = Simulation::new(config).unwrap();
    let metrics = sim.step_day(&climate).unwrap();

    assert_eq!(metrics.vectors_infected, 1);
    assert_eq!(metrics.vectors_susceptible, 0);
}

#[test]
fn zero_rate_bite_never_infects_the_vector() {
    let mut config = single_cell_config(12);
    config.transmission.host_to_vector = 0.0;

    let climate = ClimateTable::constant(25.0, 0.0, 30);
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..10 {
        let metrics = sim.step_day(&climate).unwrap();
        assert_eq!(metrics.vectors_infected, 0);
    }
}

#[test]
fn vector_infection_is_absorbing_across_days() {
    let climate = SyntheticClimate::default();
    let mut sim = Simulation::new(small_config(21)).unwrap();

    let mut previously_infected: HashSet<AgentId> = HashSet::new();
    for _ in 0..40 {
        sim.step_day(&climate).unwrap();
        for vector in sim.vectors() {
            if previously_infected.contains(&vector.id) {
                assert!(
                    !vector.is_susceptible(),
                    "vector {:?} reverted from Infected",
                    vector.id
                );
            }
        }
        previously_infected = sim
            .vectors()
            .iter()
            .filter(|v| !v.is_susceptible())
            .map(|v| v.id)
            .collect();
    }
}

#[test]
fn certain_isolation_pins_infectious_hosts_to_home() {
    let mut config = small_config(31);
    config.host_disease.isolation_probability = 1.0;
    config.population.initial_infectious_hosts = 20;

    let climate = SyntheticClimate::default();
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..40 {
        sim.step_day(&climate).unwrap();
        for host in sim.hosts() {
            if host.is_infectious() {
                assert_eq!(host.cell, host.home, "isolating infectious host left home");
            }
        }
    }
}

#[test]
fn full_lsm_every_day_keeps_the_ledger_empty() {
    let mut config = small_config(41);
    config.control.lsm.enabled = true;
    config.control.lsm.frequency_days = 1;
    config.control.lsm.coverage = 1.0;
    config.control.lsm.effectiveness = 1.0;

    let climate = SyntheticClimate::default();
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..20 {
        let metrics = sim.step_day(&climate).unwrap();
        assert!(metrics.lsm_applied);
        assert_eq!(metrics.larval_count, 0, "daily full-strength LSM clears every batch");
    }
}

#[test]
fn full_itn_irs_coverage_stops_all_onward_transmission() {
    let mut config = small_config(51);
    config.population.initial_infectious_hosts = 5;
    config.population.initial_infected_vectors = 0;
    config.transmission.vector_to_host = 1.0;
    config.transmission.host_to_vector = 1.0;
    config.control.itn_irs.enabled = true;
    config.control.itn_irs.coverage = 1.0;
    config.control.itn_irs.bite_reduction = 1.0;
    config.control.itn_irs.duration_days = 365;

    // No vector is infected when day 1's bites land, and every later bite is
    // blocked, so no host is ever exposed.
    let climate = SyntheticClimate::default();
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..30 {
        let metrics = sim.step_day(&climate).unwrap();
        assert_eq!(metrics.hosts_exposed, 0);
        assert_eq!(metrics.hosts_susceptible, 195);
    }
}

#[test]
fn missing_climate_data_falls_back_to_synthetic() {
    let empty = ClimateTable::from_series(Vec::new());
    let mut sim = Simulation::new(small_config(61)).unwrap();
    let metrics = sim.step_day(&empty).unwrap();

    assert!(metrics.climate_fallback);
    let expected = SyntheticClimate::default().generate(1);
    assert_eq!(metrics.mean_temperature, expected.mean_temperature);
    assert_eq!(metrics.precipitation, expected.precipitation);
}

#[test]
fn warm_weather_eventually_emerges_adults() {
    let mut config = small_config(71);
    config.population.vectors = 50;
    config.breeding.egg_daily_mortality = 0.0;
    config.vector.mortality_rate = 0.0;
    config.vector.parameter_jitter = 0.0;

    // 30 C over 8.3 C accumulates 21.7 degree-days; 181.2 needs 9 days.
    let climate = ClimateTable::constant(30.0, 0.0, 20);
    let mut sim = Simulation::new(config).unwrap();
    let history = sim.run(9, &climate).unwrap();

    assert!(
        history[8].total_vectors() > history[0].total_vectors(),
        "initial egg cohort should have emerged by day 9"
    );
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = small_config(81);
    config.population.initial_infectious_hosts = config.population.hosts + 1;
    assert!(Simulation::new(config).is_err());
}
