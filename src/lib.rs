//! Per-user point balances with a serialized mutation path.
//!
//! Reads go straight to the ports. Charges and uses pass through a
//! [`gate::MutationGate`] so that validation and commit happen as one step
//! relative to every other mutation.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod gate;
pub mod ports;
pub mod telemetry;
