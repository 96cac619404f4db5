#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Steady-state optical Bloch solver for ladder-type atoms, with Doppler
//! averaging over a thermal vapour.
//!
//! An N-field ladder drives levels `0 ↔ 1 ↔ ... ↔ N`. For every velocity
//! class on a grid, each field's detuning is Doppler-shifted, the
//! steady-state density matrix is solved for, and the probe absorption
//! `-Im ρ_21` is recorded. The resulting surface is then integrated against
//! a Maxwell-Boltzmann distribution to give the Doppler-broadened spectrum.

#[doc(hidden)]
pub use ndarray_npy;

pub mod utils;
pub mod error;
pub mod constants;
pub mod doppler;
pub mod fields;
pub mod grid;
pub mod ladder;
pub mod steady;
pub mod thermal;
pub mod sweep;
pub mod integrate;
pub mod config;
pub mod pipeline;

pub use error::{ Error, Result };
pub use fields::{ Direction, Field, FieldSet };
pub use pipeline::SpectrumRun;
