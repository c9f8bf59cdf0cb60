//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for agents (hosts and vectors share one id space)
///
/// Ids are handed out sequentially by the simulation so that runs with the
/// same seed produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// Simulated day counter (day 0 is the initial state, before any step)
pub type Day = u32;

/// Cell coordinate on the simulation grid
///
/// The grid is non-toroidal: coordinates outside `[0, width) x [0, height)`
/// are a programming error, not a wrapped position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (Moore neighborhood metric)
    pub fn chebyshev(&self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// One-cell step toward `target` (signum per axis), clamped to the grid
    pub fn step_toward(&self, target: Coord, width: i32, height: i32) -> Coord {
        let nx = (self.x + (target.x - self.x).signum()).clamp(0, width - 1);
        let ny = (self.y + (target.y - self.y).signum()).clamp(0, height - 1);
        Coord::new(nx, ny)
    }
}

/// Static land use of a grid cell, fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Homes, schools, offices
    Urban,
    /// Recreational zones hosts may visit
    Park,
    /// Permanent vector breeding sites
    Water,
}
