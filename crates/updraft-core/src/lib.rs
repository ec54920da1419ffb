//! Core types and definitions for the updraft aerodynamics engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, coefficient curves, configuration, errors, snapshots and
//! constants. It has no dependency on any host engine.

pub mod config;
pub mod constants;
pub mod curve;
pub mod enums;
pub mod error;
pub mod layers;
pub mod math;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
