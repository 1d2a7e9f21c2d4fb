//! Outbound request body types.
//!
//! [`RequestBody`] distinguishes three cases that matter to the transport:
//!
//! - **Empty**: presigned and body-less requests.
//! - **Reader**: a one-shot byte source that can only be consumed once.
//! - **Seekable**: a byte source the transport can rewind when it has to
//!   resend the request after a redirect or a retry.
//!
//! The signing core only stores the body; it never reads from it.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// A byte source that can be read and repositioned.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Body of an outbound request.
#[derive(Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// One-shot reader; cannot be rewound.
    Reader(Box<dyn Read + Send>),
    /// Rewindable reader, required for authenticated requests.
    Seekable(Box<dyn ReadSeek>),
}

impl RequestBody {
    /// Wrap a one-shot reader.
    #[must_use]
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// Wrap a seekable reader.
    #[must_use]
    pub fn seekable(reader: impl ReadSeek + 'static) -> Self {
        Self::Seekable(Box::new(reader))
    }

    /// Whether there is no body at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether the body can be replayed from the start.
    #[must_use]
    pub fn is_rewindable(&self) -> bool {
        !matches!(self, Self::Reader(_))
    }

    /// Seek a seekable body back to its start so it can be sent again.
    ///
    /// # Errors
    ///
    /// Fails with [`io::ErrorKind::Unsupported`] for a one-shot reader, or with
    /// whatever error the underlying seek reports.
    pub fn rewind(&mut self) -> io::Result<()> {
        match self {
            Self::Empty => Ok(()),
            Self::Seekable(inner) => inner.seek(SeekFrom::Start(0)).map(|_| ()),
            Self::Reader(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "one-shot request body cannot be rewound",
            )),
        }
    }
}

impl Read for RequestBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Empty => Ok(0),
            Self::Reader(inner) => inner.read(buf),
            Self::Seekable(inner) => inner.read(buf),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Seekable(_) => f.write_str("Seekable(..)"),
        }
    }
}
