/*!
Specialized `Error` and `Result` types for dumpflow.
*/

use std::{convert, error, fmt, result};

/// Specialized `Error` type for dumpflow errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    /// Generic error type containing a string
    Other(&'static str),
    /// IO error
    ///
    /// Catch-all for errors of the backing file.
    /// A failed write leaves the output truncated or partially
    /// populated and the caller is responsible for discarding it.
    IO(&'static str),
    /// Provider error
    ///
    /// A `DumpProvider` call failed while the writer was consuming it.
    Provider(&'static str),
    /// Byte count mismatch.
    ///
    /// A provider returned a buffer whose length diverges from the
    /// requested range during the bulk memory copy. The writer never
    /// pads or truncates silently.
    ByteCount,
    /// Flag resolution error.
    ///
    /// A symbolic protection or region type string is not part of the
    /// fixed lookup tables.
    Flags(&'static str),
}

/// Convert from &str to error
impl convert::From<&'static str> for Error {
    fn from(error: &'static str) -> Self {
        Error::Other(error)
    }
}

impl Error {
    /// Returns a tuple representing the error description and its string value.
    pub fn to_str_pair(self) -> (&'static str, Option<&'static str>) {
        match self {
            Error::Other(e) => ("other error", Some(e)),
            Error::IO(e) => ("io error", Some(e)),
            Error::Provider(e) => ("provider error", Some(e)),
            Error::ByteCount => ("provider byte count diverges from requested range", None),
            Error::Flags(e) => ("flag resolution error", Some(e)),
        }
    }

    /// Returns a simple string representation of the error.
    pub fn to_str(self) -> &'static str {
        self.to_str_pair().0
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (desc, value) = self.to_str_pair();

        if let Some(value) = value {
            write!(f, "{}: {}", desc, value)
        } else {
            f.write_str(desc)
        }
    }
}

impl error::Error for Error {}

/// Specialized `Result` type for dumpflow results.
pub type Result<T> = result::Result<T, Error>;
