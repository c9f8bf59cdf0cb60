//! Vectorsim - Agent-Based Host-Vector Epidemic Simulation

pub mod agents;
pub mod breeding;
pub mod climate;
pub mod control;
pub mod core;
pub mod metrics;
pub mod simulation;
pub mod spatial;
pub mod transmission;
