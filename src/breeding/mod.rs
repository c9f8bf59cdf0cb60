//! Vector breeding: site registry and the batched larval ledger

pub mod ledger;
pub mod sites;
