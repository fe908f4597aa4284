//! Reading and writing table collections.
//!
//! The on-disk format is a small header followed by a
//! `bincode`-serialized [`TableCollection`]:
//!
//! * 4 magic bytes
//! * a little-endian `u32` format version
//! * the serialized tables
//!
//! Table indexes are not stored.  [`TreeSequence::load`] rebuilds
//! them after reading.

use crate::tables::{IndexTablesFlags, TableCollection, TablesError};
use crate::trees::{TreeSequence, TreeSequenceFlags};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Magic bytes at the start of a tables file.
pub const MAGIC: [u8; 4] = *b"CRTS";

/// Current file format version.
pub const FILE_FORMAT_VERSION: u32 = 1;

/// Error type for file input/output.
#[derive(Error, Debug)]
pub enum FileFormatError {
    /// A wrapped [`std::io::Error`].
    #[error("{value:?}")]
    IoError {
        /// The redirected error
        #[from]
        value: std::io::Error,
    },
    /// Serialization failure.
    #[error("{value:?}")]
    EncodeError {
        /// The redirected error
        value: bincode::Error,
    },
    /// Deserialization failure, including truncated input.
    #[error("{value:?}")]
    DecodeError {
        /// The redirected error
        value: bincode::Error,
    },
    /// The input does not start with [`MAGIC`].
    #[error("Not a tables file: bad magic bytes {found:?}")]
    BadMagic {
        /// The bytes found instead
        found: [u8; 4],
    },
    /// The file version is newer than this library understands.
    #[error("Unsupported file format version: {found}")]
    UnsupportedVersion {
        /// The version found in the file
        found: u32,
    },
    /// The decoded tables are invalid.
    #[error("{value:?}")]
    TablesError {
        /// The redirected error
        #[from]
        value: TablesError,
    },
    /// A tree sequence could not be built from the decoded tables.
    #[error("{value}")]
    TreesError {
        /// The error message
        value: String,
    },
}

/// Result type for file input/output.
pub type FileFormatResult<T> = Result<T, FileFormatError>;

impl TableCollection {
    /// Write the tables to a stream.
    pub fn serialize<W: Write>(&self, mut writer: W) -> FileFormatResult<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&FILE_FORMAT_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, self)
            .map_err(|value| FileFormatError::EncodeError { value })?;
        Ok(())
    }

    /// Read tables from a stream.
    ///
    /// The returned tables are not indexed.
    ///
    /// # Errors
    ///
    /// [`FileFormatError::BadMagic`] if the stream is not a
    /// tables file, [`FileFormatError::UnsupportedVersion`]
    /// for files written by a newer library version,
    /// [`FileFormatError::DecodeError`] for corrupt or
    /// truncated input.
    pub fn deserialize<R: Read>(mut reader: R) -> FileFormatResult<Self> {
        let mut magic = [0_u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FileFormatError::BadMagic { found: magic });
        }
        let mut version = [0_u8; 4];
        reader.read_exact(&mut version)?;
        let version = u32::from_le_bytes(version);
        if version > FILE_FORMAT_VERSION {
            return Err(FileFormatError::UnsupportedVersion { found: version });
        }
        let mut tables: TableCollection = bincode::deserialize_from(&mut reader)
            .map_err(|value| FileFormatError::DecodeError { value })?;
        tables.is_indexed = false;
        tables.edge_input_order.clear();
        tables.edge_output_order.clear();
        Ok(tables)
    }

    /// Write the tables to a file, replacing any existing file.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> FileFormatResult<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        self.serialize(writer)
    }

    /// Read tables from a file.
    ///
    /// The returned tables are not indexed.
    pub fn load<P: AsRef<Path>>(path: P) -> FileFormatResult<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::deserialize(reader)
    }
}

impl TreeSequence {
    /// Write the underlying tables to a file.
    ///
    /// The file can be read back with either
    /// [`TreeSequence::load`] or [`TableCollection::load`].
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> FileFormatResult<()> {
        self.tables_copy().dump(path)
    }

    /// Read a tree sequence from a file.
    ///
    /// Indexes are rebuilt after reading, and the
    /// tables are validated.
    pub fn load<P: AsRef<Path>>(path: P) -> FileFormatResult<Self> {
        let mut tables = TableCollection::load(path)?;
        tables.build_indexes(IndexTablesFlags::default())?;
        TreeSequence::new(tables, TreeSequenceFlags::empty()).map_err(|e| {
            FileFormatError::TreesError {
                value: e.to_string(),
            }
        })
    }
}
