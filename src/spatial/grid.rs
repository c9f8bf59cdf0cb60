//! Multi-occupancy agent grid
//!
//! Each cell holds the ids of the agents currently located there, in
//! insertion order. Query results are therefore deterministic for a given
//! history of operations; callers that need an unbiased pick must shuffle or
//! `choose` through the run RNG rather than taking positional order.
//!
//! The grid is non-toroidal. Out-of-range coordinates and mismatched
//! place/remove calls are programming errors and panic with a diagnostic.

use ahash::AHashMap;

use crate::core::types::{AgentId, Coord};

pub struct AgentGrid {
    width: i32,
    height: i32,
    cells: Vec<Vec<AgentId>>,
    positions: AHashMap<AgentId, Coord>,
}

impl AgentGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as i32, height as i32);
        Self {
            width,
            height,
            cells: vec![Vec::new(); (width * height) as usize],
            positions: AHashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Coord) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: Coord) -> usize {
        assert!(
            self.in_bounds(cell),
            "coordinate {cell:?} outside {}x{} grid",
            self.width,
            self.height
        );
        (cell.y * self.width + cell.x) as usize
    }

    /// Place a new agent. Panics if the agent is already on the grid.
    pub fn place(&mut self, agent: AgentId, cell: Coord) {
        let idx = self.index(cell);
        let previous = self.positions.insert(agent, cell);
        assert!(previous.is_none(), "agent {agent:?} placed twice");
        self.cells[idx].push(agent);
    }

    /// Remove an agent entirely. Panics if the agent is not on the grid.
    pub fn remove(&mut self, agent: AgentId) {
        let cell = self
            .positions
            .remove(&agent)
            .unwrap_or_else(|| panic!("agent {agent:?} removed but never placed"));
        let idx = self.index(cell);
        self.cells[idx].retain(|&id| id != agent);
    }

    /// Move an agent to a new cell. No-op when the cell is unchanged.
    pub fn relocate(&mut self, agent: AgentId, new_cell: Coord) {
        let new_idx = self.index(new_cell);
        let old_cell = *self
            .positions
            .get(&agent)
            .unwrap_or_else(|| panic!("agent {agent:?} relocated but never placed"));
        if old_cell == new_cell {
            return;
        }
        let old_idx = self.index(old_cell);
        self.cells[old_idx].retain(|&id| id != agent);
        self.cells[new_idx].push(agent);
        self.positions.insert(agent, new_cell);
    }

    pub fn position_of(&self, agent: AgentId) -> Option<Coord> {
        self.positions.get(&agent).copied()
    }

    /// Ids of all agents in a cell, in insertion order
    pub fn agents_in(&self, cell: Coord) -> &[AgentId] {
        &self.cells[self.index(cell)]
    }

    /// Ids of all agents within Chebyshev radius `r` of `cell`, the cell
    /// itself included. Deterministic order (cell scan order, insertion
    /// order within each cell); callers randomize before choosing.
    pub fn agents_in_radius(&self, cell: Coord, r: i32) -> Vec<AgentId> {
        assert!(self.in_bounds(cell), "coordinate {cell:?} outside grid");
        let mut found = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let probe = Coord::new(cell.x + dx, cell.y + dy);
                if self.in_bounds(probe) {
                    found.extend_from_slice(self.agents_in(probe));
                }
            }
        }
        found
    }

    /// In-bounds Moore neighbors of a cell (excluding the cell itself)
    pub fn neighbors(&self, cell: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let probe = Coord::new(cell.x + dx, cell.y + dy);
                if self.in_bounds(probe) {
                    out.push(probe);
                }
            }
        }
        out
    }

    pub fn occupant_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_move_remove_roundtrip() {
        let mut grid = AgentGrid::new(10, 10);
        let a = AgentId(1);
        grid.place(a, Coord::new(2, 3));
        assert_eq!(grid.position_of(a), Some(Coord::new(2, 3)));
        assert_eq!(grid.agents_in(Coord::new(2, 3)), &[a]);

        grid.relocate(a, Coord::new(4, 4));
        assert!(grid.agents_in(Coord::new(2, 3)).is_empty());
        assert_eq!(grid.agents_in(Coord::new(4, 4)), &[a]);

        grid.remove(a);
        assert_eq!(grid.position_of(a), None);
        assert_eq!(grid.occupant_count(), 0);
    }

    #[test]
    fn multi_occupancy_preserves_all_ids() {
        let mut grid = AgentGrid::new(5, 5);
        let cell = Coord::new(1, 1);
        for id in 0..4 {
            grid.place(AgentId(id), cell);
        }
        assert_eq!(grid.agents_in(cell).len(), 4);
    }

    #[test]
    fn radius_query_clips_at_grid_edge() {
        let mut grid = AgentGrid::new(5, 5);
        grid.place(AgentId(1), Coord::new(0, 0));
        grid.place(AgentId(2), Coord::new(2, 2));
        grid.place(AgentId(3), Coord::new(4, 4));

        let near_origin = grid.agents_in_radius(Coord::new(0, 0), 2);
        assert!(near_origin.contains(&AgentId(1)));
        assert!(near_origin.contains(&AgentId(2)));
        assert!(!near_origin.contains(&AgentId(3)));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_coordinate_panics() {
        let mut grid = AgentGrid::new(5, 5);
        grid.place(AgentId(1), Coord::new(5, 0));
    }

    #[test]
    #[should_panic(expected = "placed twice")]
    fn double_place_panics() {
        let mut grid = AgentGrid::new(5, 5);
        grid.place(AgentId(1), Coord::new(0, 0));
        grid.place(AgentId(1), Coord::new(1, 1));
    }
}
