//! Spatial structures: the agent grid and the static cell-type map

pub mod cell_map;
pub mod grid;
