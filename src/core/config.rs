//! Simulation configuration
//!
//! Every tunable parameter lives here as a concrete typed field. Defaults
//! match the Jindal & Rao (2017) parameterization for Aedes-borne outbreaks.
//! `validate()` rejects inconsistent values at construction time; nothing is
//! silently clamped or renormalized at use time.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

const PROB_SUM_TOLERANCE: f64 = 1e-6;

/// Inclusive day range a per-agent duration is drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

impl DurationRange {
    pub fn fixed(days: u32) -> Self {
        Self { min: days, max: days }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min == 0 || self.min > self.max {
            return Err(ConfigError::DurationRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Daily destination distribution for one mobility archetype
///
/// The four weights must sum to 1; a violation is a fatal configuration
/// error, never renormalized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DestinationWeights {
    pub home: f64,
    pub destination: f64,
    pub park: f64,
    pub random: f64,
}

impl DestinationWeights {
    fn validate(&self, archetype: &'static str) -> Result<(), ConfigError> {
        let sum = self.home + self.destination + self.park + self.random;
        if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(ConfigError::MobilityDistribution { archetype, sum });
        }
        for (name, v) in [
            ("home", self.home),
            ("destination", self.destination),
            ("park", self.park),
            ("random", self.random),
        ] {
            check_probability(name, v)?;
        }
        Ok(())
    }
}

/// Grid dimensions and static land-use mix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of cells tagged Water (permanent breeding sites)
    pub water_ratio: f64,
    /// Fraction of cells tagged Park
    pub park_ratio: f64,
    /// Side length range for contiguous water zones
    pub water_zone_size: DurationRange,
    /// Side length range for contiguous park zones
    pub park_zone_size: DurationRange,
}

/// Initial population sizes and the archetype mix of the host population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub hosts: u32,
    pub vectors: u32,
    /// Initial egg cohort spread over permanent breeding sites
    pub initial_eggs: u32,
    pub initial_infectious_hosts: u32,
    pub initial_infected_vectors: u32,
    /// Fractions of the host population per archetype (must sum to 1)
    pub archetype_mix: ArchetypeMix,
    pub student_weights: DestinationWeights,
    pub worker_weights: DestinationWeights,
    pub roamer_weights: DestinationWeights,
    pub stationary_weights: DestinationWeights,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArchetypeMix {
    pub student: f64,
    pub worker: f64,
    pub roamer: f64,
    pub stationary: f64,
}

/// Host SEIR parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDiseaseConfig {
    /// Days in Exposed before turning Infectious, drawn per agent
    pub incubation_days: DurationRange,
    /// Days in Infectious before recovery, drawn per agent
    pub infectious_days: DurationRange,
    /// Probability an agent self-isolates on becoming Infectious
    pub isolation_probability: f64,
    /// Movement radius around home for non-isolating Infectious agents
    pub infected_home_radius: i32,
    /// Daily R -> S probability; 0 means permanent immunity
    pub immunity_loss_rate: f64,
}

/// Adult vector life-cycle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Mean daily mortality probability (Mr)
    pub mortality_rate: f64,
    /// Relative perturbation applied per agent to mortality and mating
    /// probabilities at creation (0 disables heterogeneity)
    pub parameter_jitter: f64,
    /// Daily mating success probability for unmated females (Pm)
    pub mating_probability: f64,
    /// Host detection radius in cells (Sr)
    pub sensory_range: i32,
    /// Maximum breeding-site search radius for oviposition (Fr)
    pub flight_range: i32,
    /// Days between blood meal and oviposition eligibility
    pub gonotrophic_cycle_days: u32,
    /// Eggs laid per oviposition, both sexes
    pub eggs_per_clutch: u32,
    /// Fraction of a clutch that is female (Pf); only females enter the ledger
    pub female_ratio: f64,
}

/// Immature development and breeding-site dynamics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingConfig {
    /// Degree-day base threshold, Tun-Lin et al. (1999): 8.3 C
    pub thermal_base_c: f64,
    /// Thermal constant to hatching: 181.2 C*day
    pub thermal_constant: f64,
    /// Daily per-individual mortality applied to egg batches
    pub egg_daily_mortality: f64,
    /// Optional standing-count cap per site; overflow is silently discarded
    pub site_capacity: Option<u32>,
    /// Precipitation above this spawns temporary sites (mm)
    pub rainfall_threshold_mm: f64,
    /// Temporary sites spawned per mm of precipitation over the threshold
    pub sites_per_mm: f64,
    /// Lifetime of a temporary site; rain refreshes it to this value
    pub temporary_site_lifetime_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsmConfig {
    pub enabled: bool,
    /// Applied every N days
    pub frequency_days: u32,
    pub coverage: f64,
    pub effectiveness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItnIrsConfig {
    pub enabled: bool,
    /// Fraction of host homes protected on activation
    pub coverage: f64,
    /// Probability a bite at a protected home is blocked
    pub bite_reduction: f64,
    pub duration_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub lsm: LsmConfig,
    pub itn_irs: ItnIrsConfig,
}

/// Transmission probabilities for a single bite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// alpha: infected vector -> susceptible host
    pub vector_to_host: f64,
    /// beta: infectious host -> susceptible vector
    pub host_to_vector: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    pub grid: GridConfig,
    pub population: PopulationConfig,
    pub host_disease: HostDiseaseConfig,
    pub vector: VectorConfig,
    pub breeding: BreedingConfig,
    pub transmission: TransmissionConfig,
    pub control: ControlConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid: GridConfig {
                width: 50,
                height: 50,
                water_ratio: 0.05,
                park_ratio: 0.10,
                water_zone_size: DurationRange { min: 2, max: 4 },
                park_zone_size: DurationRange { min: 3, max: 6 },
            },
            population: PopulationConfig {
                hosts: 1000,
                vectors: 2000,
                initial_eggs: 500,
                initial_infectious_hosts: 10,
                initial_infected_vectors: 5,
                archetype_mix: ArchetypeMix {
                    student: 0.30,
                    worker: 0.40,
                    roamer: 0.20,
                    stationary: 0.10,
                },
                student_weights: DestinationWeights {
                    home: 0.20,
                    destination: 0.50,
                    park: 0.30,
                    random: 0.00,
                },
                worker_weights: DestinationWeights {
                    home: 0.20,
                    destination: 0.60,
                    park: 0.10,
                    random: 0.10,
                },
                roamer_weights: DestinationWeights {
                    home: 0.35,
                    destination: 0.00,
                    park: 0.25,
                    random: 0.40,
                },
                stationary_weights: DestinationWeights {
                    home: 0.95,
                    destination: 0.00,
                    park: 0.05,
                    random: 0.00,
                },
            },
            host_disease: HostDiseaseConfig {
                incubation_days: DurationRange { min: 4, max: 6 },
                infectious_days: DurationRange { min: 5, max: 7 },
                isolation_probability: 0.7,
                infected_home_radius: 1,
                immunity_loss_rate: 0.0,
            },
            vector: VectorConfig {
                mortality_rate: 0.05,
                parameter_jitter: 0.2,
                mating_probability: 0.6,
                sensory_range: 3,
                flight_range: 5,
                gonotrophic_cycle_days: 3,
                eggs_per_clutch: 100,
                female_ratio: 0.5,
            },
            breeding: BreedingConfig {
                thermal_base_c: 8.3,
                thermal_constant: 181.2,
                egg_daily_mortality: 0.03,
                site_capacity: None,
                rainfall_threshold_mm: 5.0,
                sites_per_mm: 0.2,
                temporary_site_lifetime_days: 7,
            },
            transmission: TransmissionConfig {
                vector_to_host: 0.6,
                host_to_vector: 0.275,
            },
            control: ControlConfig {
                lsm: LsmConfig {
                    enabled: false,
                    frequency_days: 7,
                    coverage: 0.7,
                    effectiveness: 0.8,
                },
                itn_irs: ItnIrsConfig {
                    enabled: false,
                    coverage: 0.6,
                    bite_reduction: 0.7,
                    duration_days: 90,
                },
            },
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(ConfigError::ProbabilityRange { name, value });
    }
    Ok(())
}

impl SimulationConfig {
    /// Validate the full configuration for internal consistency.
    ///
    /// Called by `Simulation::new`; any error here is fatal to the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::GridDimensions {
                width: self.grid.width,
                height: self.grid.height,
            });
        }
        if self.grid.water_ratio + self.grid.park_ratio > 1.0 {
            return Err(ConfigError::Parameter {
                name: "water_ratio + park_ratio",
                reason: format!(
                    "land-use ratios exceed the grid: {}",
                    self.grid.water_ratio + self.grid.park_ratio
                ),
            });
        }
        check_probability("water_ratio", self.grid.water_ratio)?;
        check_probability("park_ratio", self.grid.park_ratio)?;
        self.grid.water_zone_size.validate("water_zone_size")?;
        self.grid.park_zone_size.validate("park_zone_size")?;

        let mix = &self.population.archetype_mix;
        let mix_sum = mix.student + mix.worker + mix.roamer + mix.stationary;
        if (mix_sum - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(ConfigError::MobilityDistribution {
                archetype: "archetype_mix",
                sum: mix_sum,
            });
        }
        self.population.student_weights.validate("student")?;
        self.population.worker_weights.validate("worker")?;
        self.population.roamer_weights.validate("roamer")?;
        self.population.stationary_weights.validate("stationary")?;
        if self.population.initial_infectious_hosts > self.population.hosts {
            return Err(ConfigError::Parameter {
                name: "initial_infectious_hosts",
                reason: "exceeds host population".into(),
            });
        }
        if self.population.initial_infected_vectors > self.population.vectors {
            return Err(ConfigError::Parameter {
                name: "initial_infected_vectors",
                reason: "exceeds vector population".into(),
            });
        }

        self.host_disease.incubation_days.validate("incubation_days")?;
        self.host_disease.infectious_days.validate("infectious_days")?;
        check_probability("isolation_probability", self.host_disease.isolation_probability)?;
        check_probability("immunity_loss_rate", self.host_disease.immunity_loss_rate)?;
        if self.host_disease.infected_home_radius < 0 {
            return Err(ConfigError::Parameter {
                name: "infected_home_radius",
                reason: "must be non-negative".into(),
            });
        }

        check_probability("mortality_rate", self.vector.mortality_rate)?;
        check_probability("parameter_jitter", self.vector.parameter_jitter)?;
        check_probability("mating_probability", self.vector.mating_probability)?;
        check_probability("female_ratio", self.vector.female_ratio)?;
        if self.vector.sensory_range < 0 || self.vector.flight_range < 0 {
            return Err(ConfigError::Parameter {
                name: "sensory_range/flight_range",
                reason: "ranges must be non-negative".into(),
            });
        }
        if self.vector.gonotrophic_cycle_days == 0 {
            return Err(ConfigError::Parameter {
                name: "gonotrophic_cycle_days",
                reason: "must be at least 1".into(),
            });
        }

        if self.breeding.thermal_constant <= 0.0 {
            return Err(ConfigError::Parameter {
                name: "thermal_constant",
                reason: "must be positive".into(),
            });
        }
        check_probability("egg_daily_mortality", self.breeding.egg_daily_mortality)?;
        if self.breeding.sites_per_mm < 0.0 || self.breeding.rainfall_threshold_mm < 0.0 {
            return Err(ConfigError::Parameter {
                name: "rainfall parameters",
                reason: "must be non-negative".into(),
            });
        }
        if self.breeding.temporary_site_lifetime_days == 0 {
            return Err(ConfigError::Parameter {
                name: "temporary_site_lifetime_days",
                reason: "must be at least 1".into(),
            });
        }

        check_probability("vector_to_host", self.transmission.vector_to_host)?;
        check_probability("host_to_vector", self.transmission.host_to_vector)?;

        check_probability("lsm coverage", self.control.lsm.coverage)?;
        check_probability("lsm effectiveness", self.control.lsm.effectiveness)?;
        if self.control.lsm.frequency_days == 0 {
            return Err(ConfigError::Parameter {
                name: "lsm frequency_days",
                reason: "must be at least 1".into(),
            });
        }
        check_probability("itn_irs coverage", self.control.itn_irs.coverage)?;
        check_probability("itn_irs bite_reduction", self.control.itn_irs.bite_reduction)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimulationConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn overfull_destination_distribution_is_rejected() {
        let mut config = SimulationConfig::default();
        // {home: 0.5, destination: 0.3, park: 0.3} sums to 1.1
        config.population.student_weights = DestinationWeights {
            home: 0.5,
            destination: 0.3,
            park: 0.3,
            random: 0.0,
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::MobilityDistribution { archetype: "student", .. }),
            "expected a distribution error, got {err:?}"
        );
    }

    #[test]
    fn empty_duration_range_is_rejected() {
        let mut config = SimulationConfig::default();
        config.host_disease.incubation_days = DurationRange { min: 6, max: 4 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut config = SimulationConfig::default();
        config.transmission.vector_to_host = 1.4;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ProbabilityRange { name: "vector_to_host", .. }));
    }
}
