// FlagSleuth - lib.rs
//
// Library entry point. The CLI in `main.rs` is a thin host over these
// modules; integration tests use them directly.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
