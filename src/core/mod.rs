// FlagSleuth - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform, app, or the CLI.

pub mod detect;
pub mod discovery;
pub mod export;
pub mod highlight;
pub mod merge;
pub mod model;
pub mod panels;
pub mod pattern;
pub mod scanner;
