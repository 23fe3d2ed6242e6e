// FlagSleuth - app/mod.rs
//
// Application layer: session lifecycle and batch orchestration.
// Dependencies: core layer, platform::fs for loading result files.

pub mod batch;
pub mod session;
