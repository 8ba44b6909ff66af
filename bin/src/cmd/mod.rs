//! CLI subcommand modules.
//!
//! This module contains the implementations for all markowitz CLI subcommands.

pub(crate) mod allocate;
pub(crate) mod estimate;
pub(crate) mod frontier;
