//! Agent populations: human hosts and adult vectors

pub mod host;
pub mod vector;
