//! Drive-cycle expansion engine.
//!
//! Turns a declarative hierarchy of steps, sub-cycles, drive cycles and
//! calendar rules into one dense current-vs-time profile spanning a
//! multi-day horizon.

pub mod config;
/// Expansion pipeline, calendar resolution and period windows.
pub mod engine;
pub mod error;
pub mod io;
/// Cycle config data model.
pub mod model;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "tui")]
pub mod tui;
