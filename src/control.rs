//! Control-strategy state
//!
//! Two strategies exist. LSM acts on the larval ledger on a day cadence (the
//! ledger itself implements the kill, see `LarvalLedger::apply_lsm`). ITN/IRS
//! marks host home cells as protected until a given day; the transmission
//! step consults this when a bite targets a host whose home is protected.

use ahash::AHashMap;

use crate::core::config::ControlConfig;
use crate::core::types::{Coord, Day};

#[derive(Default)]
pub struct ControlState {
    /// Home cell -> last protected day (inclusive)
    protected_homes: AHashMap<Coord, Day>,
    /// Whether LSM ran today, for the metrics snapshot
    lsm_applied_today: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True on days the LSM cadence fires
    pub fn lsm_due(&self, config: &ControlConfig, day: Day) -> bool {
        config.lsm.enabled && day % config.lsm.frequency_days == 0
    }

    pub fn note_lsm_applied(&mut self, applied: bool) {
        self.lsm_applied_today = applied;
    }

    pub fn lsm_applied_today(&self) -> bool {
        self.lsm_applied_today
    }

    /// Entry point used by ITN/IRS drivers: protect a home through `until_day`
    pub fn protect_home(&mut self, home: Coord, until_day: Day) {
        let entry = self.protected_homes.entry(home).or_insert(until_day);
        *entry = (*entry).max(until_day);
    }

    pub fn unprotect_home(&mut self, home: Coord) {
        self.protected_homes.remove(&home);
    }

    pub fn is_protected(&self, home: Coord, today: Day) -> bool {
        self.protected_homes
            .get(&home)
            .is_some_and(|&until| today <= until)
    }

    /// Drop protections whose duration has lapsed
    pub fn expire(&mut self, today: Day) {
        self.protected_homes.retain(|_, &mut until| today <= until);
    }

    pub fn protected_home_count(&self) -> usize {
        self.protected_homes.len()
    }
}
