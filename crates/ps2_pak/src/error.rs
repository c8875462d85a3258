//! Error types that can be emitted from this library

use std::collections::TryReserveError;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is neither a normal nor a compressed pak archive
    #[error("file is neither a normal nor a compressed pak archive")]
    #[diagnostic(help("normal archives start with \"PACK\", compressed ones carry 78 DA at offset 4"))]
    UnknownFormat,

    /// file table is malformed: {0}
    #[error("file table is malformed: {0}")]
    MalformedTable(String),

    /// entry name {name} is {len} bytes long
    #[error("entry name {name} is {len} bytes long, the table only holds {}", crate::types::MAX_NAME_LEN)]
    NameTooLong { name: String, len: usize },

    /// entry name {0:?} can not be stored in the file table
    #[error("entry name {0:?} can not be stored in the file table")]
    InvalidName(String),

    /// entry {0} was added more than once
    #[error("entry {0} was added more than once")]
    DuplicateName(String),

    /// compressed stream is corrupt: {0}
    #[error("compressed stream is corrupt: {0}")]
    CorruptCompressedStream(String),

    /// unable to allocate a buffer of the declared size
    #[error("unable to allocate a buffer of the declared size")]
    AllocationFailure(#[from] TryReserveError),

    /// archive does not fit into 32 bit offsets
    #[error("archive does not fit into 32 bit offsets")]
    ArchiveTooLarge,

    /// sprite frame table can not be relocated: {0}
    #[error("sprite frame table can not be relocated: {0}")]
    MalformedSprite(String),

    /// entry name {0} points outside of the destination directory
    #[error("entry name {0} points outside of the destination directory")]
    UnsafePath(String),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
