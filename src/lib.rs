//! Slidebreak: a lock-step tile puzzle.
//!
//! Every player block moves together on one input, smashes targets in its
//! path, shoves slide blocks to the far wall and stops where it is blocked.
//! The simulation is pure and tick-driven; `ui` in the binary is the only
//! terminal-facing code.

pub mod config;
pub mod domain;
pub mod sim;
