//! # Prelude
//!
//! Contains definitions that are useful to
//! have global
//!
//! ## Examples
//!
//! ```
//! use coalrustts_tables_trees::prelude::*;
//! ```

pub use crate::io::*;
pub use crate::newtypes::*;
pub use crate::tables::*;
pub use crate::traits::*;
pub use crate::trees::*;
