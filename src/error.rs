use core::fmt;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned when analyzing a JPEG stream fails.
pub struct Error {
    repr: Repr,
}

pub(crate) enum Repr {
    EndOfStream { offset: usize },
    Malformed { offset: usize, msg: String },
    Other(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A read would have consumed bytes past the end of the input buffer.
    EndOfStream,
    /// A segment's fields are inconsistent with its declared length.
    MalformedSegment,
    /// Any other failure, such as a pixel buffer that does not match the image dimensions.
    Other,
}

impl From<String> for Repr {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}
impl<'a> From<&'a str> for Repr {
    fn from(value: &'a str) -> Self {
        Self::Other(value.into())
    }
}

impl Error {
    pub(crate) fn from(e: impl Into<Repr>) -> Self {
        Self { repr: e.into() }
    }

    pub(crate) fn end_of_stream(offset: usize) -> Self {
        Self {
            repr: Repr::EndOfStream { offset },
        }
    }

    pub(crate) fn malformed(offset: usize, msg: impl Into<String>) -> Self {
        Self {
            repr: Repr::Malformed {
                offset,
                msg: msg.into(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            Repr::EndOfStream { .. } => ErrorKind::EndOfStream,
            Repr::Malformed { .. } => ErrorKind::MalformedSegment,
            Repr::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns the byte offset in the input at which the error was detected, if known.
    pub fn offset(&self) -> Option<usize> {
        match self.repr {
            Repr::EndOfStream { offset } | Repr::Malformed { offset, .. } => Some(offset),
            Repr::Other(_) => None,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::EndOfStream { offset } => write!(
                f,
                "reached end of data while decoding JPEG stream (at offset {offset:#x})"
            ),
            Repr::Malformed { offset, msg } => {
                write!(f, "malformed segment at offset {offset:#x}: {msg}")
            }
            Repr::Other(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for Error {}
