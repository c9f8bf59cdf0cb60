//! Adult vector agents: SI disease state and reproductive bookkeeping
//!
//! Only adult females exist as agents. Immatures live in the larval ledger,
//! and males are folded into the mating-success probability. Infection is
//! one-way: an Infected vector stays Infected until it dies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::VectorConfig;
use crate::core::types::{AgentId, Coord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorState {
    Susceptible,
    Infected,
}

#[derive(Debug, Clone)]
pub struct VectorAgent {
    pub id: AgentId,
    pub cell: Coord,
    pub state: VectorState,
    pub age_days: u32,
    pub mated: bool,
    /// Blood meal pending; consumed by a successful oviposition
    pub has_fed: bool,
    /// Reset at the start of each day; at most one bite attempt per day
    pub bitten_today: bool,
    pub days_since_oviposition: u32,
    /// Per-agent daily mortality, perturbed around the configured mean
    pub mortality_rate: f64,
    /// Per-agent mating success probability, perturbed likewise
    pub mating_probability: f64,
}

impl VectorAgent {
    /// Create an adult female, drawing its individually-perturbed biological
    /// parameters once from the configured distributions.
    pub fn new<R: Rng>(id: AgentId, cell: Coord, config: &VectorConfig, rng: &mut R) -> Self {
        Self {
            id,
            cell,
            state: VectorState::Susceptible,
            age_days: 0,
            mated: false,
            has_fed: false,
            bitten_today: false,
            days_since_oviposition: 0,
            mortality_rate: perturb(config.mortality_rate, config.parameter_jitter, rng),
            mating_probability: perturb(config.mating_probability, config.parameter_jitter, rng),
        }
    }

    pub fn is_susceptible(&self) -> bool {
        self.state == VectorState::Susceptible
    }

    /// One-way transition; Infected is absorbing
    pub fn infect(&mut self) {
        self.state = VectorState::Infected;
    }

    /// Daily mortality check; `false` means the agent dies today
    pub fn survives_today<R: Rng>(&self, rng: &mut R) -> bool {
        !rng.gen_bool(self.mortality_rate)
    }

    /// Unmated females attempt mating every day until successful
    pub fn try_mating<R: Rng>(&mut self, rng: &mut R) {
        if !self.mated && rng.gen_bool(self.mating_probability) {
            self.mated = true;
        }
    }

    pub fn ready_to_oviposit(&self, gonotrophic_cycle_days: u32) -> bool {
        self.mated && self.has_fed && self.days_since_oviposition >= gonotrophic_cycle_days
    }

    /// A successful oviposition consumes the blood meal and restarts the cycle
    pub fn record_oviposition(&mut self) {
        self.has_fed = false;
        self.days_since_oviposition = 0;
    }
}

fn perturb<R: Rng>(mean: f64, jitter: f64, rng: &mut R) -> f64 {
    if jitter == 0.0 {
        return mean;
    }
    let factor = 1.0 + rng.gen_range(-jitter..=jitter);
    (mean * factor).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_vector(jitter: f64, rng: &mut ChaCha8Rng) -> VectorAgent {
        let mut config = SimulationConfig::default().vector;
        config.parameter_jitter = jitter;
        VectorAgent::new(AgentId(7), Coord::new(0, 0), &config, rng)
    }

    #[test]
    fn zero_jitter_keeps_configured_means() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let v = test_vector(0.0, &mut rng);
        assert_eq!(v.mortality_rate, 0.05);
        assert_eq!(v.mating_probability, 0.6);
    }

    #[test]
    fn perturbed_parameters_stay_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let v = test_vector(0.5, &mut rng);
            assert!((0.0..=1.0).contains(&v.mortality_rate));
            assert!((0.0..=1.0).contains(&v.mating_probability));
        }
    }

    #[test]
    fn infection_is_absorbing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut v = test_vector(0.0, &mut rng);
        v.infect();
        v.infect();
        assert_eq!(v.state, VectorState::Infected);
        assert!(!v.is_susceptible());
    }

    #[test]
    fn oviposition_requires_mating_feeding_and_a_full_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut v = test_vector(0.0, &mut rng);
        v.days_since_oviposition = 5;
        assert!(!v.ready_to_oviposit(3), "unmated and unfed");

        v.mated = true;
        assert!(!v.ready_to_oviposit(3), "no blood meal yet");

        v.has_fed = true;
        assert!(v.ready_to_oviposit(3));

        v.record_oviposition();
        assert!(!v.has_fed, "meal consumed by the oviposition");
        assert_eq!(v.days_since_oviposition, 0);
        assert!(!v.ready_to_oviposit(3));
    }
}
