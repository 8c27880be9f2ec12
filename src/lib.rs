//! 22 Seconds library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the simulation without a window or GPU.

pub mod config;
pub mod farming;
pub mod player;
pub mod shared;
pub mod ui;
pub mod world;
