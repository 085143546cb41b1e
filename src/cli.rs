//! Command line interface.

pub mod build;
pub mod completions;
pub mod deform;
pub mod run;
pub mod utils;
