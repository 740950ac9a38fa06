//! Command implementations for polarbits-cmd

pub mod eval;
pub mod stats;
