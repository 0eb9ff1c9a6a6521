//! Core engine — the per-cycle fan-out and the run-loop state machine.

pub mod cycler;
pub mod supervisor;
