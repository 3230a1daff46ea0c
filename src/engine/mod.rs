//! Deterministic per-tick computation: signal evaluation and the ledger.
//!
//! Everything in here is synchronous and pure with respect to its inputs
//! plus prior ledger state; replays from a fresh `LedgerState` are exact.

pub mod ledger;
pub mod signal;

pub use ledger::LedgerState;
