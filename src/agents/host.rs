//! Host agents: SEIR disease state plus daily mobility
//!
//! Disease transitions happen at most once per agent per day. Mobility is a
//! categorical choice over {home, fixed destination, park, random cell},
//! overridden while the agent is Infectious: the isolation decision is made
//! once per infection episode and cleared on recovery.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{DestinationWeights, HostDiseaseConfig, PopulationConfig};
use crate::core::types::{AgentId, Coord};
use crate::spatial::cell_map::CellMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Susceptible,
    Exposed,
    Infectious,
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobilityKind {
    /// Home <-> school, frequent park visits
    Student,
    /// Home <-> workplace
    Worker,
    /// No fixed destination, wide-ranging
    Roamer,
    /// Rarely leaves home
    Stationary,
}

#[derive(Debug, Clone)]
pub struct HostAgent {
    pub id: AgentId,
    pub home: Coord,
    /// School or workplace; fixed for the whole run
    pub destination: Option<Coord>,
    pub mobility: MobilityKind,
    pub state: HealthState,
    pub days_in_state: u32,
    /// Drawn once per agent from the configured range
    pub incubation_days: u32,
    pub infectious_days: u32,
    /// None until the agent first becomes Infectious in an episode
    pub isolating: Option<bool>,
    pub cell: Coord,
}

impl HostAgent {
    pub fn new<R: Rng>(
        id: AgentId,
        home: Coord,
        destination: Option<Coord>,
        mobility: MobilityKind,
        disease: &HostDiseaseConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            home,
            destination,
            mobility,
            state: HealthState::Susceptible,
            days_in_state: 0,
            incubation_days: rng.gen_range(disease.incubation_days.min..=disease.incubation_days.max),
            infectious_days: rng.gen_range(disease.infectious_days.min..=disease.infectious_days.max),
            isolating: None,
            cell: home,
        }
    }

    pub fn is_susceptible(&self) -> bool {
        self.state == HealthState::Susceptible
    }

    pub fn is_infectious(&self) -> bool {
        self.state == HealthState::Infectious
    }

    /// S -> E on an infectious bite; any other state ignores the exposure
    pub fn expose(&mut self) {
        if self.state == HealthState::Susceptible {
            self.state = HealthState::Exposed;
            self.days_in_state = 0;
        }
    }

    /// Advance the SEIR machine by one day.
    ///
    /// The isolation decision is sampled exactly once per episode, the first
    /// day this agent is seen Infectious, and cleared again on recovery so a
    /// later re-infection re-samples.
    pub fn advance_disease<R: Rng>(&mut self, disease: &HostDiseaseConfig, rng: &mut R) {
        self.days_in_state += 1;
        match self.state {
            HealthState::Susceptible => {}
            HealthState::Exposed => {
                if self.days_in_state >= self.incubation_days {
                    self.state = HealthState::Infectious;
                    self.days_in_state = 0;
                }
            }
            HealthState::Infectious => {
                if self.days_in_state >= self.infectious_days {
                    self.state = HealthState::Recovered;
                    self.days_in_state = 0;
                    self.isolating = None;
                }
            }
            HealthState::Recovered => {
                if disease.immunity_loss_rate > 0.0 && rng.gen_bool(disease.immunity_loss_rate) {
                    self.state = HealthState::Susceptible;
                    self.days_in_state = 0;
                }
            }
        }
        if self.state == HealthState::Infectious && self.isolating.is_none() {
            self.isolating = Some(rng.gen_bool(disease.isolation_probability));
        }
    }

    /// Pick today's cell.
    ///
    /// Infectious agents override the archetype distribution: isolators pin
    /// to home; non-isolators head home first and then stay within a small
    /// radius of it.
    pub fn choose_destination<R: Rng>(
        &self,
        population: &PopulationConfig,
        disease: &HostDiseaseConfig,
        map: &CellMap,
        width: i32,
        height: i32,
        rng: &mut R,
    ) -> Coord {
        if self.state == HealthState::Infectious {
            return match self.isolating {
                Some(true) => self.home,
                _ => {
                    if self.cell != self.home {
                        self.home
                    } else {
                        random_cell_near(self.home, disease.infected_home_radius, width, height, rng)
                    }
                }
            };
        }

        let weights = weights_for(population, self.mobility);
        // Home is the first branch, so Stationary agents short-circuit here
        // almost every day without touching the park list.
        let roll: f64 = rng.gen();
        let mut acc = weights.home;
        if roll < acc {
            return self.home;
        }
        acc += weights.destination;
        if roll < acc {
            return self.destination.unwrap_or(self.home);
        }
        acc += weights.park;
        if roll < acc {
            return match map.park_cells().choose(rng) {
                Some(&park) => park,
                None => self.home,
            };
        }
        Coord::new(rng.gen_range(0..width), rng.gen_range(0..height))
    }
}

pub fn weights_for(population: &PopulationConfig, mobility: MobilityKind) -> &DestinationWeights {
    match mobility {
        MobilityKind::Student => &population.student_weights,
        MobilityKind::Worker => &population.worker_weights,
        MobilityKind::Roamer => &population.roamer_weights,
        MobilityKind::Stationary => &population.stationary_weights,
    }
}

/// Uniform cell within Chebyshev radius of `center`, clipped to the grid
fn random_cell_near<R: Rng>(
    center: Coord,
    radius: i32,
    width: i32,
    height: i32,
    rng: &mut R,
) -> Coord {
    let x_min = (center.x - radius).max(0);
    let x_max = (center.x + radius).min(width - 1);
    let y_min = (center.y - radius).max(0);
    let y_max = (center.y + radius).min(height - 1);
    Coord::new(rng.gen_range(x_min..=x_max), rng.gen_range(y_min..=y_max))
}
