use std::io;

use crate::tag::Tag;

/// Every way a parse can go wrong, fatally or otherwise.
///
/// Fatal variants (no `Font` is produced) are returned directly from
/// [`crate::font::load`]. Non-fatal variants are instead collected into the
/// [`Diagnostic`] list that accompanies a successful parse, and also logged
/// via the `log` facade at the point they occur.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read past the end of the buffer or enclosing table")]
    UnexpectedEof,

    #[error("seek target {target} is outside the visible window [{start}, {end})")]
    SeekOutOfBounds {
        target: u64,
        start: u64,
        end: u64,
    },

    #[error("offset {offset} resolves outside its enclosing table [{table_start}, {table_end})")]
    OffsetOutOfRange {
        offset: u64,
        table_start: u64,
        table_end: u64,
    },

    #[error("head.magicNumber was {found:#010x}, expected 0x5f0f3cf5")]
    InvalidMagic { found: u32 },

    #[error("unsupported format {format} in {context}")]
    UnsupportedFormat { context: &'static str, format: u32 },

    #[error("unsupported lookup type {0}")]
    UnsupportedLookupType(u16),

    #[error("malformed CFF DICT operand/operator encoding")]
    InvalidDictEncoding,

    #[error("{0} table requested without its dependency {1} having parsed successfully")]
    MissingDependency(&'static str, &'static str),

    #[error("subroutine index {0} is already on the call stack")]
    RecursiveSubroutine(u32),

    #[error("subroutine call stack exceeded the maximum depth of 10")]
    SubroutineDepthExceeded,

    #[error("table directory is empty")]
    EmptyTableDirectory,

    #[error("unrecognized container version tag {0}")]
    UnknownContainerVersion(Tag),

    #[error("required table {0} is missing")]
    RequiredTableMissing(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// A non-fatal condition encountered while parsing one table.
///
/// Parsing always keeps going after one of these; the `Font`/`Collection`
/// that `load` returns may simply be missing the affected table, or retain it
/// with a `checksum_valid: false` marker, or similar degraded-but-usable
/// state, depending on the kind.
#[derive(Debug)]
pub struct Diagnostic {
    /// The table this diagnostic pertains to, if any (e.g. `None` for a
    /// container-level issue discovered before any table was read).
    pub table: Option<Tag>,
    pub error: Error,
}

impl Diagnostic {
    pub(crate) fn new(table: Option<Tag>, error: Error) -> Self {
        log::warn!(
            "{}: {error}",
            table.map(|t| t.to_string()).unwrap_or_else(|| "<container>".to_string())
        );
        Diagnostic { table, error }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
