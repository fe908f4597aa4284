//! Table collections and tree sequences
//! implemented from the ground up in rust.
//!
//! A [``TableCollection``] records the genealogical history of a
//! sample as nodes, edges, sites, mutations, populations,
//! individuals, and provenance records.
//! A [``TreeSequence``] is an indexed, immutable view over a
//! table collection.
//!
//! Some conventions:
//!
//! 1. Time moves from the past to the present.
//!    Thus, child nodes have time values *greater than*
//!    those of their parents.  A backwards-in-time simulation
//!    records node ages as negative times, with the sampled
//!    generation at time 0.
//! 2. The data layout is "array of structures".
//! 3. Genomic locations are integers (see [``Position``]).
//! 4. Table rows may carry opaque metadata payloads.
//!    See [`coalrustts_metadata`](coalrustts_metadata) for the
//!    encoding/decoding machinery.
//!
//! Tables can be written to and read from files.
//! See the [`io`] module.

#![warn(missing_docs)]

mod macros;

pub mod io;
mod newtypes;
mod tables;
mod traits;
mod trees;

pub use newtypes::*;
pub use tables::*;
pub use traits::*;
pub use trees::*;
pub mod prelude;

/// Get the coalrustts-tables-trees version number.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
