//! Fieldscope: interactive electromagnetic field visualization.
//!
//! The crate is split into three layers. [`physics`] owns the simulation
//! state (point charges, a 1D wave line, tracer particles) and knows nothing
//! about drawing. [`render`] turns plain numbers and positions into egui
//! primitives and keeps the animated presentation state (flow particles,
//! energy history, background parallax). [`app`] wires both into an eframe
//! application and holds the UI controls.

pub mod app;
pub mod physics;
pub mod render;
