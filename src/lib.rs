// src/lib.rs
//
// Stray-field snapshot analysis: OVF ingestion, component/magnitude slices,
// and phase-gradient (Rashba coefficient) surfaces.

pub mod analysis;
pub mod config;
pub mod error;
pub mod gradient;
pub mod grid;
pub mod ovf;
pub mod rashba;
pub mod slice;
pub mod surface;
pub mod vector_field;

pub use error::{OvfError, Result};
