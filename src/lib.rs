#![warn(missing_docs)]

//! Rust library for backwards-in-time population
//! genetic simulation with tree sequence recording.
//!
//! # Overview
//!
//! The [`sim_ancestry`] function simulates the genealogical
//! history of a sample under the Hudson coalescent with
//! recombination.  Results are recorded in the table
//! collection and tree sequence types of
//! [`coalrustts_tables_trees`], which are re-exported here.
//!
//! Table rows may carry metadata.
//! See [`coalrustts_metadata`] for details.
//!
//! # Command line tools
//!
//! The package ships two binaries:
//!
//! * `makedata` runs a simulation and writes the resulting
//!   tree sequence to a file.
//! * `read_tablesfile` prints the population table of one
//!   or more tables files.

pub use coalrustts_metadata::*;
pub use coalrustts_tables_trees::*;

mod coalescent;
mod error;

pub use coalescent::{sim_ancestry, AncestryParams};
pub use error::CoalrusttsError;

pub mod prelude;

/// Get the coalrustts version number.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
