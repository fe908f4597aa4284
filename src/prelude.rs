//! # Prelude
//!
//! Contains definitions that are useful to
//! have global
//!
//! ## Examples
//!
//! ```
//! use coalrustts::prelude::*;
//! ```

pub use crate::coalescent::*;
pub use crate::error::*;
pub use coalrustts_metadata::*;
pub use coalrustts_tables_trees::prelude::*;
