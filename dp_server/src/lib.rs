//! HTTP server for the five-card draw poker engine.
//!
//! Exposes the [`draw_poker`] table actors over a small REST surface
//! plus a table-independent chat log. The binary in `main.rs` wires
//! configuration, logging, and the router together.

pub mod api;
pub mod config;
pub mod logging;
