//! Error handling
use coalrustts_metadata::MetadataError;
use coalrustts_tables_trees::io::FileFormatError;
use coalrustts_tables_trees::{TablesError, TreesError};
use thiserror::Error;

/// Primary error type.
///
/// Some members of this enum implement ``From``
/// in order to redirect other error types.
#[derive(Error, Debug)]
pub enum CoalrusttsError {
    /// Returned when simulation parameters are invalid.
    #[error("{value:?}")]
    InvalidParameter {
        /// The error message
        value: String,
    },
    /// An error that occurs during a simulation.
    #[error("{value:?}")]
    SimulationError {
        /// The error message
        value: String,
    },
    /// A redirection of a [``TablesError``]
    #[error("{value:?}")]
    TablesError {
        /// The redirected error
        #[from]
        value: TablesError,
    },
    /// A redirection of a [``TreesError``]
    #[error("{value:?}")]
    TreesError {
        /// The redirected error
        #[from]
        value: TreesError,
    },
    /// A redirection of a [``MetadataError``]
    #[error("{value:?}")]
    MetadataError {
        /// The redirected error
        #[from]
        value: MetadataError,
    },
    /// A redirection of a [``FileFormatError``]
    #[error("{value:?}")]
    FileFormatError {
        /// The redirected error
        #[from]
        value: FileFormatError,
    },
}
