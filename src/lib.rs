//! The `tractwarp` crate deforms tractograms with displacement fields
//! sampled on regular grids.

pub mod deformation;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod io;
pub mod num;
pub mod pipeline;
pub mod tractogram;

#[cfg(feature = "cli")]
pub mod cli;
