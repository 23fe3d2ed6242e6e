// FlagSleuth - platform/mod.rs
//
// Platform layer: config files, directories, result file loading.
// Dependencies: core model types, directories, memmap2, toml.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
