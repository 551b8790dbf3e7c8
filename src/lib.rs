//! Emberforge: a hands-on blacksmithing simulation.
//!
//! The player walks a small workshop, grabs hammer, tongs and billet with two
//! independently steered hands, heats the metal in the forge, shapes it with
//! real downward swings on the anvil, quenches it, and sells the result to
//! customers with limited patience.
//!
//! [`simulation::ForgeCorePlugin`] holds the whole simulation and runs
//! headless; device input and drawing are separate plugins used by the binary.

pub mod billet;
pub mod config;
pub mod constants;
pub mod economy;
pub mod error;
pub mod events;
pub mod forging;
pub mod grab;
pub mod heat;
pub mod input;
pub mod objects;
pub mod persistence;
pub mod physics;
pub mod presentation;
pub mod proximity;
pub mod simulation;
pub mod spatial;
pub mod stations;
pub mod strike;
