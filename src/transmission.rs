//! Bite resolution
//!
//! A bite is a single event between one vector and one co-located host,
//! evaluated at most once per vector per day. Exactly one transmission
//! direction can apply, decided by the pair of states; a protected home may
//! block the attempt before any transmission probability is consulted.

use rand::Rng;

use crate::agents::host::HealthState;
use crate::agents::vector::VectorState;
use crate::core::config::TransmissionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiteOutcome {
    /// ITN/IRS intercepted the attempt; no blood meal taken
    Blocked,
    /// The bite landed but neither direction applied or the roll failed
    NoTransmission,
    /// Infected vector, susceptible host: host becomes Exposed
    HostExposed,
    /// Susceptible vector, infectious host: vector becomes Infected
    VectorInfected,
}

impl BiteOutcome {
    /// Every landed bite is a blood meal, whatever the transmission roll did
    pub fn is_blood_meal(&self) -> bool {
        *self != BiteOutcome::Blocked
    }
}

/// Resolve one bite attempt.
///
/// `home_protected` and `bite_reduction` describe the ITN/IRS status of the
/// bitten host's home; the block is evaluated first so transmission
/// probabilities never fire on an intercepted bite.
pub fn resolve_bite<R: Rng>(
    vector_state: VectorState,
    host_state: HealthState,
    home_protected: bool,
    bite_reduction: f64,
    config: &TransmissionConfig,
    rng: &mut R,
) -> BiteOutcome {
    if home_protected && rng.gen_bool(bite_reduction) {
        return BiteOutcome::Blocked;
    }
    match (vector_state, host_state) {
        (VectorState::Infected, HealthState::Susceptible) => {
            if rng.gen_bool(config.vector_to_host) {
                BiteOutcome::HostExposed
            } else {
                BiteOutcome::NoTransmission
            }
        }
        (VectorState::Susceptible, HealthState::Infectious) => {
            if rng.gen_bool(config.host_to_vector) {
                BiteOutcome::VectorInfected
            } else {
                BiteOutcome::NoTransmission
            }
        }
        _ => BiteOutcome::NoTransmission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn certain() -> TransmissionConfig {
        TransmissionConfig { vector_to_host: 1.0, host_to_vector: 1.0 }
    }

    #[test]
    fn infected_vector_exposes_susceptible_host() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = resolve_bite(
            VectorState::Infected,
            HealthState::Susceptible,
            false,
            0.0,
            &certain(),
            &mut rng,
        );
        assert_eq!(outcome, BiteOutcome::HostExposed);
    }

    #[test]
    fn infectious_host_infects_susceptible_vector() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let outcome = resolve_bite(
            VectorState::Susceptible,
            HealthState::Infectious,
            false,
            0.0,
            &certain(),
            &mut rng,
        );
        assert_eq!(outcome, BiteOutcome::VectorInfected);
    }

    #[test]
    fn no_double_transmission_from_one_bite() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Infected vector biting an infectious host: neither direction applies.
        let outcome = resolve_bite(
            VectorState::Infected,
            HealthState::Infectious,
            false,
            0.0,
            &certain(),
            &mut rng,
        );
        assert_eq!(outcome, BiteOutcome::NoTransmission);
        assert!(outcome.is_blood_meal());
    }

    #[test]
    fn full_protection_blocks_before_any_roll() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            let outcome = resolve_bite(
                VectorState::Infected,
                HealthState::Susceptible,
                true,
                1.0,
                &certain(),
                &mut rng,
            );
            assert_eq!(outcome, BiteOutcome::Blocked);
            assert!(!outcome.is_blood_meal());
        }
    }

    #[test]
    fn zero_rates_never_transmit() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = TransmissionConfig { vector_to_host: 0.0, host_to_vector: 0.0 };
        for _ in 0..50 {
            let outcome = resolve_bite(
                VectorState::Infected,
                HealthState::Susceptible,
                false,
                0.0,
                &config,
                &mut rng,
            );
            assert_eq!(outcome, BiteOutcome::NoTransmission);
        }
    }
}
